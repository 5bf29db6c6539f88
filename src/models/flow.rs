use crate::models::schedule::Schedule;
use crate::models::visitor::{BillingDetails, VisitorContact};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowShape {
    /// `details → contact → payment`, the embedded page flow.
    Standard,
    /// `mode → details → contact → payment`, the modal entry that first asks
    /// whether to sign in or continue as a visitor.
    WithMode,
}

impl Default for FlowShape {
    fn default() -> Self {
        FlowShape::Standard
    }
}

impl FlowShape {
    pub fn steps(&self) -> &'static [FlowStep] {
        match self {
            FlowShape::Standard => &[FlowStep::Details, FlowStep::Contact, FlowStep::Payment],
            FlowShape::WithMode => &[
                FlowStep::Mode,
                FlowStep::Details,
                FlowStep::Contact,
                FlowStep::Payment,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowStep {
    Mode,
    Details,
    Contact,
    Payment,
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowStep::Mode => write!(f, "mode"),
            FlowStep::Details => write!(f, "details"),
            FlowStep::Contact => write!(f, "contact"),
            FlowStep::Payment => write!(f, "payment"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingMode {
    /// Signed-in user reusing a saved billing profile.
    Account,
    /// Guest entering contact details by hand.
    Visitor,
}

/// Where the checkout stands for one flow. Intent secrets are kept so a
/// repeated begin call reuses them instead of creating fresh intents.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CheckoutState {
    Idle,
    #[serde(rename_all = "camelCase")]
    PaymentIntent {
        client_secret: String,
    },
    #[serde(rename_all = "camelCase")]
    SetupIntent {
        client_secret: String,
        setup_intent_id: String,
    },
    #[serde(rename_all = "camelCase")]
    Finished {
        free: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        booking_ref: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        subscription_id: Option<String>,
    },
}

/// One visitor's in-memory booking session.
#[derive(Debug, Clone)]
pub struct FlowSession {
    pub id: Uuid,
    pub room_id: String,
    pub shape: FlowShape,
    pub active_step: usize,
    pub mode: Option<BookingMode>,
    pub schedule: Schedule,
    pub contact: Option<VisitorContact>,
    pub billing: Option<BillingDetails>,
    pub checkout: CheckoutState,
    pub touched_at: Instant,
}

impl FlowSession {
    pub fn new(room_id: String, shape: FlowShape, today: NaiveDate) -> Self {
        FlowSession {
            id: Uuid::new_v4(),
            room_id,
            shape,
            active_step: 0,
            mode: None,
            schedule: Schedule::default_for(today),
            contact: None,
            billing: None,
            checkout: CheckoutState::Idle,
            touched_at: Instant::now(),
        }
    }

    pub fn current_step(&self) -> FlowStep {
        let steps = self.shape.steps();
        steps[self.active_step.min(steps.len() - 1)]
    }

    pub fn touch(&mut self) {
        self.touched_at = Instant::now();
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            id: self.id,
            room: self.room_id.clone(),
            shape: self.shape,
            steps: self.shape.steps().iter().map(|s| s.to_string()).collect(),
            active_step: self.active_step,
            current_step: self.current_step(),
            mode: self.mode,
            schedule: self.schedule.clone(),
            contact: self.contact.clone(),
            billing: self.billing.clone(),
            checkout: self.checkout.clone(),
        }
    }
}

/// Serializable view of a session returned by every flow endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSnapshot {
    pub id: Uuid,
    pub room: String,
    pub shape: FlowShape,
    pub steps: Vec<String>,
    pub active_step: usize,
    pub current_step: FlowStep,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<BookingMode>,
    pub schedule: Schedule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<VisitorContact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing: Option<BillingDetails>,
    pub checkout: CheckoutState,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlowRequest {
    pub room: String,
    #[serde(default)]
    pub shape: FlowShape,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JumpStepRequest {
    pub step: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChooseModeRequest {
    pub mode: BookingMode,
}
