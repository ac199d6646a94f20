//! Identity extraction from upstream auth headers.
//!
//! Authentication itself is an external collaborator: by the time a
//! request reaches this service, a gateway has validated the session and
//! stamped `x-user-id` (UUID) and `x-user-role` onto it. Identity is then
//! passed explicitly into every service call; nothing reads it from
//! ambient state.

use axum::http::HeaderMap;
use common::{BuyerId, SellerId};
use domain::Role;
use orders::Actor;
use uuid::Uuid;

use crate::error::ApiError;

/// The authenticated identity of the current request.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

impl Identity {
    /// Parses identity from the upstream auth headers.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let user_id = headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing x-user-id header".to_string()))?;
        let user_id = Uuid::parse_str(user_id)
            .map_err(|e| ApiError::Unauthorized(format!("Invalid x-user-id: {e}")))?;

        let role = match headers.get("x-user-role").and_then(|v| v.to_str().ok()) {
            Some(raw) => raw
                .parse::<Role>()
                .map_err(ApiError::Unauthorized)?,
            None => Role::Customer,
        };

        Ok(Self { user_id, role })
    }

    /// The identity acting as a buyer.
    pub fn buyer(&self) -> BuyerId {
        BuyerId::from_uuid(self.user_id)
    }

    /// The identity acting on the order-management surface.
    ///
    /// Admins manage everything; sellers only their own orders. Plain
    /// customers have no access here.
    pub fn actor(&self) -> Result<Actor, ApiError> {
        match self.role {
            Role::Admin => Ok(Actor::Admin),
            Role::Sales => Ok(Actor::Seller(SellerId::from_uuid(self.user_id))),
            Role::Customer => Err(ApiError::Forbidden(
                "Seller or admin role required".to_string(),
            )),
        }
    }

    /// The identity acting as a seller (dashboard surface).
    pub fn seller(&self) -> Result<SellerId, ApiError> {
        match self.role {
            Role::Sales => Ok(SellerId::from_uuid(self.user_id)),
            _ => Err(ApiError::Forbidden("Seller role required".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(id: Option<&str>, role: Option<&str>) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(id) = id {
            map.insert("x-user-id", HeaderValue::from_str(id).unwrap());
        }
        if let Some(role) = role {
            map.insert("x-user-role", HeaderValue::from_str(role).unwrap());
        }
        map
    }

    #[test]
    fn test_missing_header_is_unauthorized() {
        let result = Identity::from_headers(&headers(None, None));
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_role_defaults_to_customer() {
        let uuid = Uuid::new_v4();
        let identity = Identity::from_headers(&headers(Some(&uuid.to_string()), None)).unwrap();
        assert_eq!(identity.role, Role::Customer);
        assert_eq!(identity.buyer().as_uuid(), uuid);
    }

    #[test]
    fn test_customer_cannot_act_on_orders() {
        let uuid = Uuid::new_v4();
        let identity =
            Identity::from_headers(&headers(Some(&uuid.to_string()), Some("customer"))).unwrap();
        assert!(matches!(identity.actor(), Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn test_sales_role_maps_to_seller_actor() {
        let uuid = Uuid::new_v4();
        let identity =
            Identity::from_headers(&headers(Some(&uuid.to_string()), Some("sales"))).unwrap();
        match identity.actor().unwrap() {
            Actor::Seller(seller) => assert_eq!(seller.as_uuid(), uuid),
            other => panic!("expected seller actor, got {other:?}"),
        }
        assert!(identity.seller().is_ok());
    }

    #[test]
    fn test_admin_is_not_a_seller() {
        let uuid = Uuid::new_v4();
        let identity =
            Identity::from_headers(&headers(Some(&uuid.to_string()), Some("admin"))).unwrap();
        assert_eq!(identity.actor().unwrap(), Actor::Admin);
        assert!(matches!(identity.seller(), Err(ApiError::Forbidden(_))));
    }
}
