//! Crate-internal helpers

/// `emit!(ctx, "fmt", args..)` writes through the context's packed emitter
macro_rules! emit {
    ($ctx:expr, $($arg:tt)*) => {
        $ctx.emit(format_args!($($arg)*))
    };
}

pub(crate) use emit;
