//! Explicit configuration for the receipt renderer and the print path.
//!
//! Branding used to live in a shared settings context of the point-of-sale
//! client.  Here it is a plain value passed to the renderer, loadable from a
//! JSON file so deployments can rebrand without recompiling.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV_VAR: &str = "BILL_RECEIPT_CONFIG";

/// Image shown next to the brand title.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoSource {
    /// Encoded image bytes (PNG, JPEG, ...).
    Bytes(Vec<u8>),
    /// Path of an image file.
    Path(PathBuf),
}

/// Business identity printed in the receipt header and footer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandingConfig {
    /// Brand title, also the file name prefix.
    pub shop_name: String,
    /// Subtitle under the brand title.
    pub tagline: String,
    /// Postal address line.
    pub address: String,
    /// Contact phone number.
    pub phone: String,
    /// Contact email address.
    pub email: String,
    /// Public website shown in the footer.
    pub website: String,
    /// Social media handle shown in the footer.
    pub social_handle: String,
    /// Name used in the thank-you line.
    pub venue_name: String,
    /// Accent colour for the title, rules and the total band.
    pub accent_color: [u8; 3],
    /// Optional logo.
    pub logo: Option<LogoSource>,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            shop_name: "SPOT".to_owned(),
            tagline: "Professional Restaurant POS".to_owned(),
            address: "123 Food Street, Colombo 03, Sri Lanka".to_owned(),
            phone: "+94 11 234 5678".to_owned(),
            email: "hello@spot.lk".to_owned(),
            website: "www.spotrestaurant.lk".to_owned(),
            social_handle: "@spot_restaurant".to_owned(),
            venue_name: "SPOT Restaurant".to_owned(),
            accent_color: [24, 131, 77],
            logo: None,
        }
    }
}

impl BrandingConfig {
    /// Returns the second header line combining phone and email.
    pub fn contact_line(&self) -> String {
        format!("Tel: {} | Email: {}", self.phone, self.email)
    }

    /// Returns the footer line combining social handle and website.
    pub fn social_line(&self) -> String {
        format!("Follow us {} | {}", self.social_handle, self.website)
    }

    /// Returns the footer thank-you line.
    pub fn thank_you_line(&self) -> String {
        format!("Thank you for dining with {}!", self.venue_name)
    }
}

/// What happens when the item table outgrows the page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    /// Continue on new pages with a repeated table header.
    #[default]
    Paginate,
    /// Keep drawing below the page bottom on a single page.
    Unbounded,
}

/// Layout and formatting options for the PDF receipt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Prefix in front of every amount.
    pub currency_prefix: String,
    /// Maximum number of characters of a product name in the item column.
    pub name_max_chars: usize,
    /// Page overflow policy.
    pub overflow: Overflow,
    /// Whether to reject bills that break the data model invariants.
    pub validate: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            currency_prefix: "Rs. ".to_owned(),
            name_max_chars: 22,
            overflow: Overflow::Paginate,
            validate: true,
        }
    }
}

/// Options for the HTML print path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintOptions {
    /// Document title of the print page.
    pub title: String,
    /// Delay before printing on surfaces without a ready signal, in milliseconds.
    pub ready_fallback_delay_ms: u64,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            title: "SPOT Bill".to_owned(),
            ready_fallback_delay_ms: 250,
        }
    }
}

impl PrintOptions {
    /// Returns the fallback delay as a [`Duration`].
    pub fn ready_fallback_delay(&self) -> Duration {
        Duration::from_millis(self.ready_fallback_delay_ms)
    }
}

/// Complete configuration as stored in a JSON file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptConfig {
    /// Business identity.
    pub branding: BrandingConfig,
    /// PDF layout options.
    pub render: RenderOptions,
    /// Print path options.
    pub print: PrintOptions,
}

impl ReceiptConfig {
    /// Reads a config from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the config from `explicit`, then from [`CONFIG_ENV_VAR`], falling back to defaults.
    ///
    /// An explicitly requested file must exist.  A file named by the environment
    /// variable that is missing only produces a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            debug!("Loading receipt config from {}", path.display());
            return Self::from_path(path);
        }

        let Some(path) = env::var_os(CONFIG_ENV_VAR).map(PathBuf::from) else {
            return Ok(Self::default());
        };
        if path.as_os_str().is_empty() {
            return Ok(Self::default());
        }

        if path.is_file() {
            debug!("Loading receipt config from {} ({})", path.display(), CONFIG_ENV_VAR);
            Self::from_path(&path)
        } else {
            warn!(
                "{} points to missing file {}; using default receipt config",
                CONFIG_ENV_VAR,
                path.display()
            );
            Ok(Self::default())
        }
    }
}
