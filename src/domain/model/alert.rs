use std::fmt;

/// Alert text sent when the watched price drops below the threshold
#[derive(Clone, Debug, PartialEq)]
pub struct AlertMessage {
    pub price: f64,
    pub threshold: f64,
}

impl AlertMessage {
    pub fn new(price: f64, threshold: f64) -> Self {
        Self { price, threshold }
    }
}

impl fmt::Display for AlertMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ALERT: Price ({}) is below threshold ({})!",
            self.price, self.threshold
        )
    }
}

/// Strict comparison: a price equal to the threshold does not alert
pub fn breaches_threshold(price: f64, threshold: f64) -> bool {
    price < threshold
}

/// What the notifier did in one iteration
#[derive(Clone, Debug, PartialEq)]
pub enum AlertOutcome {
    Sent(AlertMessage),
    Skipped { price: f64, threshold: f64 },
}
