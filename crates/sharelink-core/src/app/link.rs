//! LinkIssuer - id の発行と共有 URL の組み立て

use std::sync::Arc;

use crate::domain::ArtifactId;
use crate::ports::IdGenerator;

/// Compose the public URL of an artifact. Pure string composition.
pub fn build_share_url(base_url: &str, id: ArtifactId) -> String {
    format!("{}/share/{}", base_url.trim().trim_end_matches('/'), id)
}

#[derive(Clone)]
pub struct LinkIssuer {
    base_url: String,
    ids: Arc<dyn IdGenerator>,
}

impl LinkIssuer {
    pub fn new(base_url: impl Into<String>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            base_url: base_url.into(),
            ids,
        }
    }

    pub fn issue_id(&self) -> ArtifactId {
        self.ids.generate_artifact_id()
    }

    pub fn share_url(&self, id: ArtifactId) -> String {
        build_share_url(&self.base_url, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::RandomIdGenerator;
    use rstest::rstest;

    #[rstest]
    #[case::plain("https://share.example.com")]
    #[case::trailing_slash("https://share.example.com/")]
    #[case::many_slashes("https://share.example.com///")]
    #[case::padded("  https://share.example.com  ")]
    fn share_url_has_single_separator(#[case] base: &str) {
        let id = ArtifactId::from_u128(1);
        assert_eq!(
            build_share_url(base, id),
            format!("https://share.example.com/share/{id}")
        );
    }

    #[test]
    fn issuer_combines_ids_and_urls() {
        let issuer = LinkIssuer::new("http://localhost:8080/", Arc::new(RandomIdGenerator));
        let a = issuer.issue_id();
        let b = issuer.issue_id();
        assert_ne!(a, b);
        assert_eq!(issuer.share_url(a), format!("http://localhost:8080/share/{a}"));
    }
}
