//! `list`: the restaurant listing rendered as text cards.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::Args;
use pronto_core::{AppConfig, DataSourceKind, RestaurantRecord, UserLocation};
use pronto_listing::{
    apply_filters_and_sorting, apply_user_distance, render_card, FilterParams, NoGeocoder,
    RestaurantCard, SortKey, SortOrder, SortSpec, ViewState,
};
use pronto_sources::{DataSource, NominatimGeocoder};

pub(crate) const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub(crate) const DEFAULT_USER_AGENT: &str = "Pronto-Restaurant-App/1.0";

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Read restaurants from this CSV instead of the configured source
    #[arg(long)]
    pub csv: Option<PathBuf>,
    /// Maximum distance in miles
    #[arg(long)]
    pub max_distance: Option<f64>,
    /// Minimum rating on a 0-10 scale
    #[arg(long, default_value_t = 0.0)]
    pub min_rating: f64,
    #[arg(long, default_value_t = 0)]
    pub min_reviews: u32,
    /// Restaurant name contains
    #[arg(long, default_value = "")]
    pub name: String,
    /// Deal text contains
    #[arg(long, default_value = "")]
    pub deal: String,
    #[arg(long)]
    pub max_price: Option<f64>,
    /// distance, rating, review_count or price
    #[arg(long, default_value = "distance")]
    pub sort_by: SortKey,
    /// asc or desc
    #[arg(long, default_value = "asc")]
    pub sort_order: SortOrder,
    /// Show every deal detail and menu link
    #[arg(long)]
    pub expand_all: bool,
    /// Your latitude; use together with --lon
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,
    /// Your longitude; use together with --lat
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
    /// Resolve street addresses through the geocoder
    #[arg(long)]
    pub geocode: bool,
}

impl ListArgs {
    fn filter_params(&self) -> FilterParams {
        FilterParams {
            max_distance: self.max_distance,
            min_rating: self.min_rating,
            min_reviews: self.min_reviews,
            name_query: self.name.clone(),
            deal_query: self.deal.clone(),
            max_price: self.max_price,
        }
    }

    fn user_location(&self) -> UserLocation {
        match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => UserLocation {
                latitude,
                longitude,
                address: "Custom Location".to_string(),
            },
            _ => UserLocation::city_centre_default(),
        }
    }
}

/// The CSV override, or the configured source (connecting when it is the database).
pub(crate) async fn open_source(
    csv: Option<&Path>,
) -> anyhow::Result<(DataSource, Option<AppConfig>)> {
    if let Some(path) = csv {
        return Ok((DataSource::Csv(path.to_path_buf()), None));
    }
    let config = pronto_core::load_app_config()?;
    let pool = if config.data_source == DataSourceKind::Database {
        Some(pronto_db::connect_pool_from_config(&config).await?)
    } else {
        None
    };
    let source = DataSource::from_config(&config, pool)?;
    Ok((source, Some(config)))
}

pub(crate) fn build_geocoder(config: Option<&AppConfig>) -> anyhow::Result<NominatimGeocoder> {
    let geocoder = match config {
        Some(c) => {
            NominatimGeocoder::with_base_url(c.http_timeout_secs, &c.user_agent, &c.geocoder_url)?
        }
        None => NominatimGeocoder::new(DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_USER_AGENT)?,
    };
    Ok(geocoder)
}

pub(crate) async fn load_records(
    source: &DataSource,
    config: Option<&AppConfig>,
    geocode: bool,
) -> anyhow::Result<Vec<RestaurantRecord>> {
    if geocode {
        let geocoder = build_geocoder(config)?;
        Ok(source.load_records(&geocoder).await)
    } else {
        Ok(source.load_records(&NoGeocoder).await)
    }
}

pub(crate) async fn run_list(args: &ListArgs) -> anyhow::Result<()> {
    let (source, config) = open_source(args.csv.as_deref()).await?;
    let mut records = load_records(&source, config.as_ref(), args.geocode).await?;
    if records.is_empty() {
        println!("No restaurant data found");
        return Ok(());
    }

    let user = args.user_location();
    apply_user_distance(&mut records, user.coordinates());

    let params = args.filter_params();
    let selected = apply_filters_and_sorting(
        &records,
        &params,
        SortSpec::new(args.sort_by, args.sort_order),
    );
    let view = if args.expand_all {
        ViewState::expanded_everywhere()
    } else {
        ViewState::new()
    };

    println!(
        "{} of {} restaurants near {}\n",
        selected.len(),
        records.len(),
        user.address
    );
    for record in selected {
        println!("{}", format_card(&render_card(record, &view, &params.deal_query)));
    }
    Ok(())
}

fn format_card(card: &RestaurantCard) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}  {} {}  {}",
        card.name, card.stars, card.rating_label, card.distance
    );
    if !card.address.is_empty() {
        let _ = writeln!(out, "  {}", card.address);
    }
    if let Some(note) = &card.deals_note {
        let _ = writeln!(out, "  {note}");
    }
    for deal in &card.deals {
        let _ = writeln!(out, "  - {}", deal.summary);
        if let Some(detail) = &deal.detail {
            let _ = writeln!(out, "      {detail}");
        }
    }
    if let Some(menu) = &card.menu_url {
        let _ = writeln!(out, "  Menu: {menu}");
    }
    out
}
