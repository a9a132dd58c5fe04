//! TemplateRepository trait definition.

use chatrelay_types::error::RepositoryError;
use chatrelay_types::template::{IntroTemplate, WelcomeTemplate};

/// Repository trait for the language-scoped, read-only reference data.
///
/// `None` for a supported language is a configuration fault; the services
/// turn it into a fatal [`TemplateError`](chatrelay_types::error::TemplateError).
pub trait TemplateRepository: Send + Sync {
    /// The welcome template for a language, if configured.
    fn welcome(
        &self,
        lang: &str,
    ) -> impl std::future::Future<Output = Result<Option<WelcomeTemplate>, RepositoryError>> + Send;

    /// The intro template for a language, if configured.
    fn intro(
        &self,
        lang: &str,
    ) -> impl std::future::Future<Output = Result<Option<IntroTemplate>, RepositoryError>> + Send;
}
