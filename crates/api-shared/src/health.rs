use crate::dto::HealthRes;

/// Simple health service shared by the REST binaries.
///
/// Provides a standardised way to report that the Mobi Mama service is up.
#[derive(Clone)]
pub struct HealthService;

impl HealthService {
    /// Static health check; no instance required.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Mobi Mama is alive".into(),
        }
    }
}
