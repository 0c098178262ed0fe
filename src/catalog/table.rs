//! The operation table.
//!
//! Every canonical operation is listed exactly once. Consumers pass a callback
//! macro (plus an optional context block) and receive the whole table, one
//! line per operation:
//!
//! ```text
//! <shape> <Name> <method> <lock|nolock> "<mnemonic>" "<doc>";
//! ```
//!
//! The shape fixes operand/result arity and how the result is produced:
//!
//! | shape      | operands | results | result          |
//! |------------|----------|---------|-----------------|
//! | `rmw`      | 1        | 0       | none            |
//! | `rmw_cf`   | 2        | 1       | carry flag      |
//! | `unary`    | 0        | 0       | none            |
//! | `unary_zf` | 0        | 1       | zero flag       |
//! | `rmw_zf`   | 1        | 1       | zero flag       |
//! | `bit_cf`   | 1        | 1       | carry flag      |
//! | `cmpxchg`  | 2        | 1       | prior value     |
//! | `wide`     | 4        | 2       | prior pair      |
//! | `exchange` | 1        | 1       | prior value     |
//!
//! `rmw_cf` takes the incoming carry as its second operand and loads it into
//! CF in the same `asm!` block as the locked instruction; the outgoing carry
//! is returned. Code the compiler emits between two blocks may clobber the
//! flags, so a carry chain is threaded through values, never through RFLAGS.

/// Invokes `$callback! { { ctx } table... }` with the full operation table.
macro_rules! operation_table {
    ($callback:ident { $($ctx:tt)* }) => {
        $callback! {
            { $($ctx)* }
            rmw Add add lock "add"
                "Adds `operand` to the target.";
            rmw_cf AddWithCarry add_with_carry lock "adc"
                "Adds `operand` plus `carry` to the target and returns the carry out.";
            rmw And and lock "and"
                "Bitwise-ands the target with `operand`.";
            rmw Or or lock "or"
                "Bitwise-ors the target with `operand`.";
            rmw Xor xor lock "xor"
                "Bitwise-xors the target with `operand`.";
            rmw Subtract subtract lock "sub"
                "Subtracts `operand` from the target.";
            rmw_cf SubtractWithBorrow subtract_with_borrow lock "sbb"
                "Subtracts `operand` plus `borrow` from the target and returns the borrow out.";
            unary Increment increment lock "inc"
                "Adds one to the target.";
            unary Decrement decrement lock "dec"
                "Subtracts one from the target.";
            unary Negate negate lock "neg"
                "Replaces the target with its two's-complement negation.";
            unary Not not lock "not"
                "Replaces the target with its bitwise complement.";
            unary_zf IncrementAndCheckZero increment_and_check_zero lock "inc"
                "Adds one to the target and returns whether the result is zero.";
            unary_zf DecrementAndCheckZero decrement_and_check_zero lock "dec"
                "Subtracts one from the target and returns whether the result is zero.";
            rmw_zf XorAndCheckZero xor_and_check_zero lock "xor"
                "Bitwise-xors the target with `operand` and returns whether the result is zero.";
            bit_cf BitTestAndSet bit_test_and_set lock "bts"
                "Sets bit `bit` of the target and returns its previous value.";
            bit_cf BitTestAndReset bit_test_and_reset lock "btr"
                "Clears bit `bit` of the target and returns its previous value.";
            bit_cf BitTestAndComplement bit_test_and_complement lock "btc"
                "Flips bit `bit` of the target and returns its previous value.";
            cmpxchg CompareAndSwap compare_and_swap lock "cmpxchg"
                "Stores `desired` if the target equals `expected`. Returns the value observed before the operation.";
            wide CompareAndSwap2x compare_and_swap_2x lock "cmpxchg16b"
                "Stores the `desired` pair if the 128-bit target equals the `expected` pair. Returns the pair observed before the operation.";
            exchange AddAndSwap add_and_swap lock "xadd"
                "Adds `operand` to the target and returns the value it held before.";
            exchange Swap swap nolock "xchg"
                "Stores `operand` into the target and returns the value it held before.";
        }
    };
}

pub(crate) use operation_table;
