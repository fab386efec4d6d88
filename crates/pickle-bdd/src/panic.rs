//! Rendering of panic payloads caught from step handlers.

/// Extracts a panic payload into a human-readable message.
///
/// Attempts to downcast common primitives before falling back to an opaque
/// description that includes the payload `TypeId`.
///
/// # Examples
/// ```
/// use pickle_bdd::panic_message;
///
/// let err = std::panic::catch_unwind(|| panic!("boom"))
///     .expect_err("expected panic");
/// assert_eq!(panic_message(err.as_ref()), "boom");
/// ```
#[must_use]
pub fn panic_message(e: &(dyn std::any::Any + Send)) -> String {
    macro_rules! try_downcast {
        ($($ty:ty),* $(,)?) => {
            $(
                if let Some(val) = e.downcast_ref::<$ty>() {
                    return val.to_string();
                }
            )*
        };
    }

    try_downcast!(&str, String, i32, u32, i64, u64, isize, usize);
    format!(
        "non-string panic payload (TypeId({:?}))",
        e.type_id()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_formatted_panics() {
        let Err(payload) = std::panic::catch_unwind(|| panic!("bad {}", 42)) else {
            panic!("closure should panic");
        };
        assert_eq!(panic_message(payload.as_ref()), "bad 42");
    }

    #[test]
    fn describes_opaque_payloads() {
        let Err(payload) = std::panic::catch_unwind(|| std::panic::panic_any(vec![1_u8])) else {
            panic!("closure should panic");
        };
        assert!(panic_message(payload.as_ref()).starts_with("non-string panic payload"));
    }
}
