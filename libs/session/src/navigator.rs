//! Navigation seam for terminal session failures

/// Client-side navigation hook.
///
/// The refresh interceptor invokes [`redirect_to_login`] exactly once per
/// terminal refresh failure, after credentials have been cleared. The front
/// end decides what "navigate to the login entry point" means for it.
///
/// [`redirect_to_login`]: Navigator::redirect_to_login
pub trait Navigator: Send + Sync {
    /// Force navigation to the login entry point
    fn redirect_to_login(&self);
}

/// Navigator that does nothing; useful for tests and non-interactive tools
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn redirect_to_login(&self) {}
}
