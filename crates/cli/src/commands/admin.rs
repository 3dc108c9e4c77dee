//! Admin dashboard commands.
//!
//! # Environment Variables
//!
//! - `COUPONS_ADMIN_EMAIL` - Admin email (or `--email`)
//! - `COUPONS_ADMIN_PASSWORD` - Admin password

use std::io::Write;
use std::sync::Arc;

use coupon_codes_catalog::routing::Route;
use coupon_codes_catalog::{
    AuthError, AuthGate, CatalogConfig, CatalogViewModel, CouponCard, FirebaseAuthGate,
    FirestoreStore, RemoteError, resolve_route,
};
use coupon_codes_core::{CategoryId, CouponId, Email, Locale};
use tracing::info;

use super::{CliError, CouponInput, fill_form, write_card};

/// A signed-in admin session with the dashboard loaded.
pub struct Dashboard {
    gate: FirebaseAuthGate,
    catalog: CatalogViewModel,
}

impl Dashboard {
    /// Sign in and load every coupon and category.
    pub async fn open(config: &CatalogConfig, email: Option<&str>) -> Result<Self, CliError> {
        let email = email
            .or(config.admin_email.as_deref())
            .ok_or(CliError::MissingCredential("email"))?;
        let email = Email::parse(email)?;
        let password = config
            .admin_password
            .as_ref()
            .ok_or(CliError::MissingCredential("password"))?;

        let gate = FirebaseAuthGate::new(&config.firebase).map_err(RemoteError::from)?;
        gate.sign_in(&email, password).await?;

        let session = gate.current_session();
        let session = match (resolve_route(Route::Dashboard, session.as_ref()), session) {
            (Route::Dashboard, Some(session)) => session,
            _ => return Err(AuthError::SignInRequired.into()),
        };

        let store = FirestoreStore::new(&config.firebase)?.with_session(&session);
        let catalog = CatalogViewModel::admin(Arc::new(store), &session)?;
        catalog.reload().await?;
        info!(email = %email, "Dashboard opened");
        Ok(Self { gate, catalog })
    }

    /// Approved coupons by display order, then pending coupons.
    pub fn list(&self) -> Result<(), CliError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "Approved")?;
        for coupon in self.catalog.approved_coupons() {
            write_card(&mut out, &CouponCard::new(&coupon, Locale::En))?;
        }
        writeln!(out, "\nPending Approval")?;
        for coupon in self.catalog.pending_coupons() {
            write_card(&mut out, &CouponCard::new(&coupon, Locale::En))?;
        }
        Ok(())
    }

    pub async fn set_approval(&self, id: &str, approved: bool) -> Result<(), CliError> {
        let id = CouponId::new(id);
        self.catalog.set_approval(&id, approved).await?;
        let verb = if approved { "Approved" } else { "Disapproved" };
        writeln!(std::io::stdout().lock(), "{verb} {id}")?;
        Ok(())
    }

    /// Save free-text order input for a coupon.
    pub async fn set_order(&self, id: &str, value: &str) -> Result<(), CliError> {
        let id = CouponId::new(id);
        self.catalog.edit_order_draft(&id, value);
        let order = self.catalog.commit_order_draft(&id).await?;
        writeln!(std::io::stdout().lock(), "Order of {id} set to {order}")?;
        Ok(())
    }

    pub async fn delete_coupon(&self, id: &str) -> Result<(), CliError> {
        let id = CouponId::new(id);
        self.catalog.delete_coupon(&id).await?;
        writeln!(std::io::stdout().lock(), "Deleted {id}")?;
        Ok(())
    }

    pub async fn add_coupon(&self, input: CouponInput) -> Result<(), CliError> {
        fill_form(&self.catalog, input)?;
        let coupon = self.catalog.add_coupon().await?;
        writeln!(std::io::stdout().lock(), "Added {} (pending)", coupon.id)?;
        Ok(())
    }

    pub fn list_categories(&self) -> Result<(), CliError> {
        let mut out = std::io::stdout().lock();
        for category in self.catalog.categories() {
            writeln!(
                out,
                "{}  {} / {}",
                category.id, category.name_en, category.name_ar
            )?;
        }
        Ok(())
    }

    pub async fn add_category(&self, name_en: &str, name_ar: &str) -> Result<(), CliError> {
        self.catalog.add_category(name_en, name_ar).await?;
        writeln!(
            std::io::stdout().lock(),
            "Added category {} / {}",
            name_en.trim(),
            name_ar.trim()
        )?;
        Ok(())
    }

    pub async fn delete_category(&self, id: &str) -> Result<(), CliError> {
        let id = CategoryId::new(id);
        self.catalog.delete_category(&id).await?;
        writeln!(std::io::stdout().lock(), "Deleted category {id}")?;
        Ok(())
    }

    /// Sign out.
    pub async fn close(self) {
        self.gate.sign_out().await;
    }
}
