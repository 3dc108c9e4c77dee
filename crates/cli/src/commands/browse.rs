//! Public catalog commands.

use std::io::Write;
use std::sync::Arc;

use coupon_codes_catalog::{CatalogConfig, CatalogViewModel, FirestoreStore, PreferenceStore};
use coupon_codes_core::{CategoryFilter, Locale};
use tracing::info;

use super::{CliError, CouponInput, fill_form, write_card};

/// List approved coupons matching the filters.
pub async fn run(
    config: &CatalogConfig,
    search: Option<String>,
    category: Option<String>,
    locale: Option<Locale>,
) -> Result<(), CliError> {
    let locale = match locale {
        Some(locale) => locale,
        None => {
            PreferenceStore::new(&config.preferences_path)
                .load_locale()
                .await?
        }
    };

    let catalog = CatalogViewModel::public(Arc::new(FirestoreStore::new(&config.firebase)?));
    catalog.reload().await?;
    if let Some(term) = search {
        catalog.set_search_term(term);
    }
    if let Some(name) = category {
        catalog.select_category(CategoryFilter::named(name));
    }

    let mut out = std::io::stdout().lock();
    let labels: Vec<String> = catalog
        .category_options(locale)
        .into_iter()
        .map(|option| option.label)
        .collect();
    writeln!(out, "{}", labels.join(" | "))?;

    let cards = catalog.cards(locale);
    if cards.is_empty() {
        let empty = match locale {
            Locale::En => "No coupons found.",
            Locale::Ar => "لا توجد كوبونات.",
        };
        writeln!(out, "{empty}")?;
    }
    for card in &cards {
        write_card(&mut out, card)?;
    }
    Ok(())
}

/// Submit a coupon; it stays hidden until an admin approves it.
pub async fn submit(config: &CatalogConfig, input: CouponInput) -> Result<(), CliError> {
    let catalog = CatalogViewModel::public(Arc::new(FirestoreStore::new(&config.firebase)?));
    catalog.reload().await?;
    fill_form(&catalog, input)?;
    let coupon = catalog.add_coupon().await?;
    info!(coupon_id = %coupon.id, "Coupon submitted for approval");
    writeln!(std::io::stdout().lock(), "Submitted {} for approval", coupon.id)?;
    Ok(())
}
