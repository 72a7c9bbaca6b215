pub mod account;
pub mod api;
pub mod config;
pub mod time;
pub mod transaction;

pub mod rpc;

// Assert a condition at compile time. Used to keep cross-constant
// invariants (like the snapshot/history relation) checked by the compiler.
#[macro_export]
macro_rules! static_assert {
    ($cond:expr $(,)?) => {
        const _: () = assert!($cond);
    };
    ($cond:expr, $msg:literal $(,)?) => {
        const _: () = assert!($cond, $msg);
    };
}
