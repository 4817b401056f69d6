//! Step definitions and the transition graph for each wizard flow.
//!
//! A flow is a fixed, ordered set of steps. The path a user actually takes is
//! decided by [`StepGraph::advance`], which only looks at the current step and
//! the choice fields of the form, so routing can be tested without a
//! controller.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::form::{Acknowledgement, FormState, IssueCategory, RequestKind};
use crate::wizard::validation::FieldKey;

/// The wizard flows offered by the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    Request,
    IssueReport,
}

impl Flow {
    pub fn label(self) -> &'static str {
        match self {
            Flow::Request => "Request",
            Flow::IssueReport => "Issue report",
        }
    }

    /// Checklist that must be fully acknowledged before submitting this flow.
    pub fn checklist(self) -> &'static [Acknowledgement] {
        match self {
            Flow::Request => &[
                Acknowledgement::DetailsAccurate,
                Acknowledgement::SecurityPolicy,
                Acknowledgement::CostResponsibility,
                Acknowledgement::DataClassification,
            ],
            Flow::IssueReport => &[Acknowledgement::DetailsAccurate],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    RequestType,
    AccountSetup,
    AwsAccount,
    AccessGrants,
    StorageTier,
    Lifecycle,
    ChangeRequest,
    IssueCategory,
    IssueDetails,
    Confirmation,
    Success,
}

impl StepId {
    pub fn as_str(self) -> &'static str {
        match self {
            StepId::RequestType => "request_type",
            StepId::AccountSetup => "account_setup",
            StepId::AwsAccount => "aws_account",
            StepId::AccessGrants => "access_grants",
            StepId::StorageTier => "storage_tier",
            StepId::Lifecycle => "lifecycle",
            StepId::ChangeRequest => "change_request",
            StepId::IssueCategory => "issue_category",
            StepId::IssueDetails => "issue_details",
            StepId::Confirmation => "confirmation",
            StepId::Success => "success",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing function for steps whose successor depends on an earlier choice.
pub type BranchFn = fn(&FormState) -> Option<StepId>;

/// How a step hands over to the next one.
#[derive(Clone, Copy)]
pub enum Transition {
    Next(StepId),
    Branch(BranchFn),
    /// Leaving the step requires a confirmed submission.
    Submit,
    Terminal,
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Next(step) => write!(f, "Next({step})"),
            Transition::Branch(_) => f.write_str("Branch"),
            Transition::Submit => f.write_str("Submit"),
            Transition::Terminal => f.write_str("Terminal"),
        }
    }
}

/// Declarative description of a single wizard page.
#[derive(Debug, Clone)]
pub struct StepDefinition {
    pub id: StepId,
    pub title: &'static str,
    pub required: Vec<FieldKey>,
    /// The account identifier must be remotely confirmed before leaving the step.
    pub remote_check: bool,
    pub transition: Transition,
}

impl StepDefinition {
    fn new(id: StepId, title: &'static str, required: Vec<FieldKey>, transition: Transition) -> Self {
        Self {
            id,
            title,
            required,
            remote_check: false,
            transition,
        }
    }

    fn with_remote_check(mut self) -> Self {
        self.remote_check = true;
        self
    }
}

/// The ordered steps of one flow plus their transitions.
#[derive(Debug, Clone)]
pub struct StepGraph {
    flow: Flow,
    steps: Vec<StepDefinition>,
}

impl StepGraph {
    pub fn for_flow(flow: Flow) -> Self {
        let steps = match flow {
            Flow::Request => request_steps(),
            Flow::IssueReport => issue_report_steps(),
        };
        Self { flow, steps }
    }

    pub fn flow(&self) -> Flow {
        self.flow
    }

    pub fn initial(&self) -> StepId {
        self.steps[0].id
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    pub fn definition(&self, id: StepId) -> Option<&StepDefinition> {
        self.steps.iter().find(|step| step.id == id)
    }

    pub fn contains(&self, id: StepId) -> bool {
        self.definition(id).is_some()
    }

    /// Zero-based position of the step in the flow's fixed ordering.
    pub fn position(&self, id: StepId) -> Option<usize> {
        self.steps.iter().position(|step| step.id == id)
    }

    /// Successor of `current` for the given form, or `None` when the step
    /// cannot be left by plain navigation (submission, terminal, or an
    /// unanswered branch choice).
    pub fn advance(&self, current: StepId, form: &FormState) -> Option<StepId> {
        match self.definition(current)?.transition {
            Transition::Next(next) => Some(next),
            Transition::Branch(route) => route(form),
            Transition::Submit | Transition::Terminal => None,
        }
    }
}

fn request_steps() -> Vec<StepDefinition> {
    let checklist = Flow::Request
        .checklist()
        .iter()
        .copied()
        .map(FieldKey::Acknowledgement)
        .collect();

    vec![
        StepDefinition::new(
            StepId::RequestType,
            "What do you need?",
            vec![FieldKey::RequestKind],
            Transition::Branch(route_request_kind),
        ),
        StepDefinition::new(
            StepId::AccountSetup,
            "New account details",
            vec![FieldKey::AccountName, FieldKey::OwnerName, FieldKey::OwnerEmail],
            Transition::Next(StepId::AccessGrants),
        ),
        StepDefinition::new(
            StepId::AwsAccount,
            "AWS account",
            vec![FieldKey::AwsAccountId],
            Transition::Next(StepId::AccessGrants),
        )
        .with_remote_check(),
        StepDefinition::new(
            StepId::AccessGrants,
            "Who needs access?",
            vec![FieldKey::AccessGrants],
            Transition::Next(StepId::Confirmation),
        ),
        StepDefinition::new(
            StepId::StorageTier,
            "Storage tier and buckets",
            vec![FieldKey::StorageTier, FieldKey::Buckets],
            Transition::Next(StepId::Lifecycle),
        ),
        StepDefinition::new(
            StepId::Lifecycle,
            "Lifecycle and retention",
            vec![FieldKey::RetentionDays],
            Transition::Next(StepId::Confirmation),
        ),
        StepDefinition::new(
            StepId::ChangeRequest,
            "Describe the change",
            vec![FieldKey::ChangeDetails],
            Transition::Next(StepId::Confirmation),
        ),
        StepDefinition::new(
            StepId::Confirmation,
            "Review and confirm",
            checklist,
            Transition::Submit,
        ),
        StepDefinition::new(StepId::Success, "Request submitted", Vec::new(), Transition::Terminal),
    ]
}

fn issue_report_steps() -> Vec<StepDefinition> {
    let checklist = Flow::IssueReport
        .checklist()
        .iter()
        .copied()
        .map(FieldKey::Acknowledgement)
        .collect();

    vec![
        StepDefinition::new(
            StepId::IssueCategory,
            "What is the issue about?",
            vec![FieldKey::IssueCategory],
            Transition::Branch(route_issue_category),
        ),
        StepDefinition::new(
            StepId::AwsAccount,
            "Affected AWS account",
            vec![FieldKey::AwsAccountId],
            Transition::Next(StepId::IssueDetails),
        )
        .with_remote_check(),
        StepDefinition::new(
            StepId::IssueDetails,
            "Describe the issue",
            vec![FieldKey::IssueDescription],
            Transition::Next(StepId::Confirmation),
        ),
        StepDefinition::new(
            StepId::Confirmation,
            "Review and confirm",
            checklist,
            Transition::Submit,
        ),
        StepDefinition::new(StepId::Success, "Issue reported", Vec::new(), Transition::Terminal),
    ]
}

fn route_request_kind(form: &FormState) -> Option<StepId> {
    Some(match form.request_kind? {
        RequestKind::NewAccount => StepId::AccountSetup,
        RequestKind::AccessChange => StepId::AwsAccount,
        RequestKind::Storage => StepId::StorageTier,
        RequestKind::ChangeSettings => StepId::ChangeRequest,
    })
}

fn route_issue_category(form: &FormState) -> Option<StepId> {
    Some(match form.issue_category? {
        IssueCategory::AccountAccess => StepId::AwsAccount,
        IssueCategory::Billing | IssueCategory::Storage | IssueCategory::Other => {
            StepId::IssueDetails
        }
    })
}
