//! Synthetic event generation.
//!
//! Every generated event is well-formed for its kind: message kinds carry a
//! non-empty `message`, alpha events carry every field the alpha template
//! needs.

use crate::error::{ProducerError, ProducerResult};
use chrono::Utc;
use herald_content::{Amount, Event, EventKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

/// Kinds picked from when no kind is requested.
pub const SYNTHESIZABLE: [EventKind; 4] = [
    EventKind::MonitoringAlert,
    EventKind::BusinessUpdate,
    EventKind::ScheduledContent,
    EventKind::AlphaNewToken,
];

const SERVICES: &[&str] = &["web-server", "database", "api-gateway", "cache-cluster"];
const ALERT_TYPES: &[&str] = &["high CPU usage", "memory pressure", "elevated latency", "error rate spike"];
const SEVERITIES: &[&str] = &["low", "medium", "high"];
const REGIONS: &[&str] = &["us-east-1", "us-west-2", "eu-west-1", "ap-southeast-1"];
const ENVIRONMENTS: &[&str] = &["production", "staging"];

const BUSINESS_CATEGORIES: &[&str] = &["sales", "product", "users", "partnerships"];
const BUSINESS_UPDATES: &[&str] = &[
    "Quarterly revenue up 15%",
    "New feature launched",
    "Active users passed one million",
    "New partnership signed",
];
const PRIORITIES: &[&str] = &["normal", "high"];
const DEPARTMENTS: &[&str] = &["sales", "product", "marketing"];
const AUTHORS: &[&str] = &["ops-bot", "growth-team", "pm-office"];

const TIPS: &[&str] = &[
    "Tip: automate the boring parts of your deploys",
    "Tip: keep secrets out of your repository",
    "Tip: alert on symptoms, not causes",
    "Tip: measure before you optimize",
];
const TAGS: &[&str] = &["devops", "tips", "engineering", "productivity"];

const CHAINS: &[(&str, &str)] = &[
    ("BASE", "https://basescan.org/token/"),
    ("ETH", "https://etherscan.io/token/"),
    ("BSC", "https://bscscan.com/token/"),
    ("ARB", "https://arbiscan.io/token/"),
];
const TOKEN_NAMES: &[&str] = &["Nebula", "Quasar", "Driftwood", "Lumen", "Harbor", "Ember"];

/// Resolve a user-supplied kind name.
///
/// Accepts any discriminator spelling plus the short names `alert`,
/// `business`, `scheduled` and `alpha`.
pub fn parse_kind(raw: &str) -> ProducerResult<EventKind> {
    let kind = match raw.trim().to_ascii_lowercase().as_str() {
        "alert" => EventKind::MonitoringAlert,
        "business" => EventKind::BusinessUpdate,
        "scheduled" => EventKind::ScheduledContent,
        "alpha" => EventKind::AlphaNewToken,
        other => EventKind::from_discriminator(other),
    };
    match kind {
        EventKind::Unknown => Err(ProducerError::Config(format!("unknown event kind '{}'", raw))),
        kind => Ok(kind),
    }
}

/// Random event source.
pub struct EventGenerator {
    rng: StdRng,
}

impl Default for EventGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl EventGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for tests and reproducible batches.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate an event of `kind`, or of a random synthesizable kind.
    ///
    /// `Unknown` falls back to a monitoring alert.
    pub fn generate(&mut self, kind: Option<EventKind>) -> Event {
        let kind = kind.unwrap_or_else(|| SYNTHESIZABLE[self.rng.gen_range(0..SYNTHESIZABLE.len())]);

        match kind {
            EventKind::AlphaNewToken => self.alpha_new_token(),
            EventKind::BusinessUpdate => self.business_update(),
            EventKind::ScheduledContent => self.scheduled_content(),
            EventKind::Generic => Event::generic(self.pick(TIPS)),
            EventKind::Test => self.test_event(),
            EventKind::MonitoringAlert | EventKind::Unknown => self.monitoring_alert(),
        }
    }

    /// Short random suffix for queue ids.
    pub fn suffix(&mut self) -> String {
        format!("{:06x}", self.rng.gen_range(0..0x100_0000u32))
    }

    fn pick(&mut self, items: &[&'static str]) -> &'static str {
        items[self.rng.gen_range(0..items.len())]
    }

    fn monitoring_alert(&mut self) -> Event {
        let service = self.pick(SERVICES);
        let alert_type = self.pick(ALERT_TYPES);
        let now = Utc::now();

        let mut event = Event::of_kind(EventKind::MonitoringAlert);
        event.message = Some(format!(
            "🚨 Alert: {} reported {} at {}",
            service,
            alert_type,
            now.format("%H:%M:%S")
        ));
        event.metadata.insert("service".into(), json!(service));
        event.metadata.insert("alert_type".into(), json!(alert_type));
        event.metadata.insert("severity".into(), json!(self.pick(SEVERITIES)));
        event.metadata.insert("timestamp".into(), timestamp_value());
        let server_id = format!("srv-{}", self.rng.gen_range(1000..=9999));
        event.metadata.insert(
            "metadata".into(),
            json!({
                "server_id": server_id,
                "region": self.pick(REGIONS),
                "environment": self.pick(ENVIRONMENTS),
            }),
        );
        event
    }

    fn business_update(&mut self) -> Event {
        let update = self.pick(BUSINESS_UPDATES);

        let mut event = Event::of_kind(EventKind::BusinessUpdate);
        event.message = Some(format!(
            "📈 Business update: {} ({})",
            update,
            Utc::now().format("%Y-%m-%d")
        ));
        event.metadata.insert("category".into(), json!(self.pick(BUSINESS_CATEGORIES)));
        event.metadata.insert("priority".into(), json!(self.pick(PRIORITIES)));
        event.metadata.insert("timestamp".into(), timestamp_value());
        event.metadata.insert(
            "metadata".into(),
            json!({
                "department": self.pick(DEPARTMENTS),
                "author": self.pick(AUTHORS),
            }),
        );
        event
    }

    fn scheduled_content(&mut self) -> Event {
        let tip = self.pick(TIPS);
        let first = self.pick(TAGS);
        let second = self.pick(TAGS);

        let mut event = Event::of_kind(EventKind::ScheduledContent);
        event.message = Some(format!("{} #{}", tip, Utc::now().format("%Y%m%d")));
        event.metadata.insert("tags".into(), json!([first, second]));
        event.metadata.insert("timestamp".into(), timestamp_value());
        event.metadata.insert(
            "metadata".into(),
            json!({ "content_type": "tip", "scheduled": true }),
        );
        event
    }

    fn alpha_new_token(&mut self) -> Event {
        let (chain, explorer_base) = CHAINS[self.rng.gen_range(0..CHAINS.len())];
        let name = self.pick(TOKEN_NAMES);
        let symbol = name.chars().take(4).collect::<String>().to_uppercase();
        let contract = self.hex_address();
        let deployer = self.hex_address();

        let amount = if self.rng.gen_bool(0.5) {
            Amount::from(self.rng.gen_range(10_000u64..=50_000_000))
        } else {
            let cents = self.rng.gen_range(100_000u64..=100_000_000);
            Amount::from(cents as f64 / 100.0)
        };

        let mut event = Event::of_kind(EventKind::AlphaNewToken);
        event.chain = Some(chain.to_string());
        event.address = Some(deployer);
        event.name = Some(name.to_string());
        event.symbol = Some(symbol);
        event.amount = Some(amount);
        event.explorer = Some(format!("{}{}", explorer_base, contract));
        event.contract = Some(contract);
        event.threshold = Some(Amount::from(10_000u64));
        event.detected_at = Some(Utc::now().to_rfc3339());
        event
    }

    fn test_event(&mut self) -> Event {
        let mut event = Event::of_kind(EventKind::Test);
        event.message = Some(format!(
            "🧪 Test post {}",
            Utc::now().format("%H:%M:%S")
        ));
        event.metadata.insert("timestamp".into(), timestamp_value());
        event
    }

    fn hex_address(&mut self) -> String {
        let mut address = String::with_capacity(42);
        address.push_str("0x");
        for _ in 0..40 {
            let digit = self.rng.gen_range(0..16u32);
            address.push(char::from_digit(digit, 16).unwrap_or('0'));
        }
        address
    }
}

/// Current time as fractional Unix seconds.
pub fn unix_seconds() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

fn timestamp_value() -> Value {
    json!(unix_seconds())
}
