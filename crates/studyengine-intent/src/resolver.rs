//! Intent resolver: rules first, LLM fallback, confidence gate.

use std::sync::Arc;

use tracing::{debug, info, warn};

use studyengine_llm::CompletionBackend;

use crate::error::{IntentError, Result};
use crate::inference::{extract_topic, infer_source_label, infer_source_type};
use crate::parser::LlmIntentParser;
use crate::populate::populate_workflow;
use crate::rules::RuleClassifier;
use crate::templates::template_for;
use crate::types::{ContextPayload, ParsedIntent, PopulatedWorkflow, ResolutionTier};

/// Minimum confidence for an LLM-derived intent.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.4;

/// A resolved intent tagged with the tier that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub intent: ParsedIntent,
    pub tier: ResolutionTier,
}

/// A resolved intent together with its populated workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowPlan {
    pub intent: ParsedIntent,
    pub workflow: PopulatedWorkflow,
    pub tier: ResolutionTier,
}

/// Orchestrates the rule classifier and the LLM parser.
pub struct IntentResolver {
    rules: RuleClassifier,
    parser: LlmIntentParser,
    confidence_threshold: f64,
}

impl IntentResolver {
    /// Build a resolver with the standard rule table.
    pub fn new(llm: Arc<dyn CompletionBackend>) -> Result<Self> {
        Ok(Self {
            rules: RuleClassifier::standard()?,
            parser: LlmIntentParser::new(llm),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        })
    }

    /// Override the confidence threshold for LLM-derived intents.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Override the model used by the LLM fallback.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.parser = self.parser.with_model(model);
        self
    }

    /// Replace the rule classifier.
    pub fn with_rules(mut self, rules: RuleClassifier) -> Self {
        self.rules = rules;
        self
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    /// Resolve `prompt` into an intent.
    pub async fn resolve(
        &self,
        prompt: &str,
        context: Option<&ContextPayload>,
    ) -> Result<ParsedIntent> {
        self.resolve_with_tier(prompt, context)
            .await
            .map(|r| r.intent)
    }

    /// Resolve `prompt`, also reporting which tier produced the intent.
    pub async fn resolve_with_tier(
        &self,
        prompt: &str,
        context: Option<&ContextPayload>,
    ) -> Result<Resolution> {
        if prompt.trim().is_empty() {
            return Err(IntentError::EmptyPrompt);
        }

        // Tier 1: rules. No LLM call on a hit.
        if let Some(hit) = self.rules.classify(prompt) {
            let intent = ParsedIntent {
                workflow_type: hit.workflow_type,
                source: infer_source_label(context).to_owned(),
                source_type: infer_source_type(context),
                topic: extract_topic(prompt, context),
                confidence: hit.confidence,
            };
            info!(
                workflow = %intent.workflow_type,
                confidence = intent.confidence,
                "intent resolved via rules"
            );
            return Ok(Resolution {
                intent,
                tier: ResolutionTier::Rules,
            });
        }

        // Tier 2: LLM fallback.
        debug!("no rule matched, falling back to LLM");
        let llm_intent = self.parser.parse_intent(prompt, context).await?;
        let confidence = llm_intent.confidence;

        let intent = match llm_intent.into_parsed() {
            Some(intent) if confidence >= self.confidence_threshold => intent,
            _ => {
                warn!(
                    confidence,
                    threshold = self.confidence_threshold,
                    "LLM intent rejected"
                );
                return Err(IntentError::Rejected);
            }
        };

        info!(
            workflow = %intent.workflow_type,
            confidence = intent.confidence,
            "intent resolved via LLM"
        );
        Ok(Resolution {
            intent,
            tier: ResolutionTier::Llm,
        })
    }

    /// Resolve `prompt` and populate the matching template.
    pub async fn plan(
        &self,
        prompt: &str,
        context: Option<&ContextPayload>,
    ) -> Result<WorkflowPlan> {
        let Resolution { intent, tier } = self.resolve_with_tier(prompt, context).await?;
        let workflow = populate_workflow(template_for(intent.workflow_type), &intent)?;
        Ok(WorkflowPlan {
            intent,
            workflow,
            tier,
        })
    }
}
