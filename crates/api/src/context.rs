use axum::http::HeaderMap;

use oneclick_core::TenantId;

/// Header carrying the caller's tenant.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Tenant a request acts for, taken from `X-Tenant-Id`.
///
/// Every catalog read and every one-click creation is scoped to it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TenantContext {
    tenant_id: TenantId,
}

impl TenantContext {
    pub fn new(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }

    /// `None` when the header is missing, blank, or not a UUID.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(TENANT_HEADER)?.to_str().ok()?.trim();
        if value.is_empty() {
            return None;
        }
        value.parse().ok().map(Self::new)
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn tenant_header_must_be_a_uuid() {
        let mut headers = HeaderMap::new();
        assert_eq!(TenantContext::from_headers(&headers), None);

        headers.insert(TENANT_HEADER, HeaderValue::from_static("  "));
        assert_eq!(TenantContext::from_headers(&headers), None);

        headers.insert(TENANT_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert_eq!(TenantContext::from_headers(&headers), None);

        let tenant_id = TenantId::new();
        headers.insert(
            TENANT_HEADER,
            HeaderValue::from_str(&format!(" {tenant_id} ")).unwrap(),
        );
        assert_eq!(
            TenantContext::from_headers(&headers).map(|c| c.tenant_id()),
            Some(tenant_id)
        );
    }
}
