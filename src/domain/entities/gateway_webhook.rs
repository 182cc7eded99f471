use serde::Deserialize;

pub const CHARGE_COMPLETED: &str = "charge.completed";

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// `data` object of a `charge.completed` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct ChargeCompleted {
    pub tx_ref: String,
    pub status: String,
    /// Gateway transaction id. Numeric in practice, accepted as string too.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub flw_ref: Option<String>,
}

impl ChargeCompleted {
    pub fn transaction_id(&self) -> Option<String> {
        match self.id.as_ref()? {
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}

/// Inbound gateway webhook, tagged by event type.
#[derive(Debug, Clone)]
pub enum GatewayWebhook {
    ChargeCompleted {
        charge: ChargeCompleted,
        /// Untouched `data` object, persisted alongside the payment.
        raw: serde_json::Value,
    },
    /// Any event we do not act on; acknowledged as a no-op.
    Other { event: String },
}

impl GatewayWebhook {
    pub fn parse(body: &str) -> Result<Self, String> {
        let envelope: Envelope =
            serde_json::from_str(body).map_err(|e| format!("Invalid webhook payload: {}", e))?;

        if envelope.event != CHARGE_COMPLETED {
            return Ok(GatewayWebhook::Other {
                event: envelope.event,
            });
        }

        let charge: ChargeCompleted = serde_json::from_value(envelope.data.clone())
            .map_err(|e| format!("Invalid charge.completed data: {}", e))?;

        if charge.tx_ref.trim().is_empty() {
            return Err("Missing tx_ref in charge.completed data".into());
        }

        Ok(GatewayWebhook::ChargeCompleted {
            charge,
            raw: envelope.data,
        })
    }

    pub fn event_type(&self) -> &str {
        match self {
            GatewayWebhook::ChargeCompleted { .. } => CHARGE_COMPLETED,
            GatewayWebhook::Other { event } => event,
        }
    }
}
