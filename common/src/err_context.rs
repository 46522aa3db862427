/// A module for providing error context

/// An error (E), and some context describing what was being attempted.
#[derive(Debug)]
pub struct ErrorContext<E>(pub String, pub E);

/// Creating a trait to extend an API by adding a context. method.
pub trait ErrorContextExt<T, E> {
    fn context<C: AsRef<str>>(self, c: C) -> Result<T, ErrorContext<E>>;
}

impl<T, E> ErrorContextExt<T, E> for Result<T, E> {
    fn context<C: AsRef<str>>(self, c: C) -> Result<T, ErrorContext<E>> {
        self.map_err(|e| ErrorContext(c.as_ref().to_string(), e))
    }
}
