//! Authentication, profile, addresses and orders for the signed-in customer.

use freshwater_core::{AddressId, OrderId, Page};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{instrument, warn};

use crate::types::{
    Address, AddressInput, AuthResponse, CheckoutRequest, LoginRequest, MeResponse, Order,
    RefreshResponse, RegisterRequest, UpdateMeRequest,
};
use crate::{BackendClient, BackendError};

impl BackendClient {
    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for a user and token pair.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unauthorized`] for bad credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, BackendError> {
        self.send_json(
            Method::POST,
            "auth/login/",
            None,
            &LoginRequest { email, password },
        )
        .await
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Api`] with field errors when the backend
    /// rejects the form.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: &RegisterRequest) -> Result<AuthResponse, BackendError> {
        self.send_json(Method::POST, "auth/register/", None, form)
            .await
    }

    /// Current user and profile.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unauthorized`] when the token is stale.
    #[instrument(skip(self, token))]
    pub async fn me(&self, token: &SecretString) -> Result<MeResponse, BackendError> {
        self.get("auth/me/", Some(token)).await
    }

    /// Partially update the current user and profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or validation fails.
    #[instrument(skip(self, token, update))]
    pub async fn update_me(
        &self,
        token: &SecretString,
        update: &UpdateMeRequest,
    ) -> Result<MeResponse, BackendError> {
        self.send_json(Method::PATCH, "auth/me/", Some(token), update)
            .await
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unauthorized`] when the refresh token is
    /// expired or revoked.
    #[instrument(skip(self, refresh))]
    pub async fn refresh(&self, refresh: &SecretString) -> Result<RefreshResponse, BackendError> {
        self.send_json(
            Method::POST,
            "auth/refresh/",
            None,
            &json!({ "refresh": refresh.expose_secret() }),
        )
        .await
    }

    /// Revoke the refresh token. Failures are logged and otherwise ignored.
    #[instrument(skip(self, access, refresh))]
    pub async fn logout(&self, access: &SecretString, refresh: &SecretString) {
        let result: Result<serde_json::Value, BackendError> = self
            .send_json(
                Method::POST,
                "auth/logout/",
                Some(access),
                &json!({ "refresh": refresh.expose_secret() }),
            )
            .await;
        if let Err(e) = result {
            warn!(error = %e, "Backend logout failed; clearing local session anyway");
        }
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn list_addresses(&self, token: &SecretString) -> Result<Vec<Address>, BackendError> {
        let page: Page<Address> = self.get_list("addresses/", Some(token), &[("page_size", "100")]).await?;
        Ok(page.results)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or validation fails.
    #[instrument(skip(self, token, address))]
    pub async fn create_address(
        &self,
        token: &SecretString,
        address: &AddressInput,
    ) -> Result<Address, BackendError> {
        self.send_json(Method::POST, "addresses/", Some(token), address)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or validation fails.
    #[instrument(skip(self, token, address), fields(address_id = %id))]
    pub async fn update_address(
        &self,
        token: &SecretString,
        id: AddressId,
        address: &AddressInput,
    ) -> Result<Address, BackendError> {
        self.send_json(Method::PUT, &format!("addresses/{id}/"), Some(token), address)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(address_id = %id))]
    pub async fn delete_address(&self, token: &SecretString, id: AddressId) -> Result<(), BackendError> {
        self.delete(&format!("addresses/{id}/"), Some(token)).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// The customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn list_orders(
        &self,
        token: &SecretString,
        page: u32,
    ) -> Result<Page<Order>, BackendError> {
        self.get_list("orders/", Some(token), &[("page", page.max(1))])
            .await
    }

    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for orders that are not the caller's.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn get_order(&self, token: &SecretString, id: OrderId) -> Result<Order, BackendError> {
        self.get(&format!("orders/{id}/"), Some(token)).await
    }

    /// Place an order. The backend re-prices lines and checks stock.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Api`] when stock or addresses are invalid.
    #[instrument(skip(self, token, request), fields(lines = request.items.len()))]
    pub async fn checkout(
        &self,
        token: &SecretString,
        request: &CheckoutRequest,
    ) -> Result<Order, BackendError> {
        let order: Order = self
            .send_json(Method::POST, "orders/checkout/", Some(token), request)
            .await?;
        // Stock changed; cached product pages are stale.
        for line in &request.items {
            self.inner
                .cache
                .invalidate(&crate::cache::CacheKey::Product(line.product_id))
                .await;
        }
        Ok(order)
    }
}
