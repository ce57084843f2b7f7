//! Domain prompt templates.
//!
//! Each [`Mode`] is bound to exactly one static template; requests without a
//! mode use [`DEFAULT_TEMPLATE`].

use ai_llm_service::{ChatMessage, MessageRole};
use bio_metadata::Mode;

/// Static prompt text for one domain.
#[derive(Debug, PartialEq, Eq)]
pub struct PromptTemplate {
    /// Template name, the mode's wire value or `default`.
    pub name: &'static str,
    pub system_prompt: &'static str,
    /// Heading placed before the retrieved context.
    pub context_preamble: &'static str,
    /// Sentence placed between the context and the question.
    pub question_lead: &'static str,
}

impl PromptTemplate {
    /// Builds the message list sent to the model.
    ///
    /// The system prompt always comes first. With a non-blank `context`, the
    /// last user message becomes
    /// `"<preamble>\n\n<context>\n\n<lead>\n\n<question>"`; other messages are
    /// passed through untouched.
    pub fn format_messages(
        &self,
        messages: &[ChatMessage],
        context: Option<&str>,
    ) -> Vec<ChatMessage> {
        let mut out = Vec::with_capacity(messages.len() + 1);
        out.push(ChatMessage::system(self.system_prompt));

        let context = context.map(str::trim).filter(|c| !c.is_empty());
        let last_user = question_index(messages);

        for (i, msg) in messages.iter().enumerate() {
            match (context, last_user) {
                (Some(ctx), Some(j)) if i == j => out.push(ChatMessage::user(format!(
                    "{}\n\n{}\n\n{}\n\n{}",
                    self.context_preamble, ctx, self.question_lead, msg.content
                ))),
                _ => out.push(msg.clone()),
            }
        }
        out
    }
}

/// Position of the message that carries the question: the last user message
/// with non-blank content.
pub fn question_index(messages: &[ChatMessage]) -> Option<usize> {
    messages
        .iter()
        .rposition(|m| m.role == MessageRole::User && !m.content.trim().is_empty())
}

pub static DEFAULT_TEMPLATE: PromptTemplate = PromptTemplate {
    name: "default",
    system_prompt: "You are a helpful assistant. Answer using the provided context when it is \
relevant. If the context does not contain the answer, say so instead of guessing.",
    context_preamble: "Context information is below.",
    question_lead: "Given the context information and not prior knowledge, answer the question:",
};

pub static CLINICAL_TEMPLATE: PromptTemplate = PromptTemplate {
    name: "clinical",
    system_prompt: "You are a clinical research assistant specialized in clinical trial documents, \
eligibility criteria, dosing schemas and safety information. When answering:

1. Focus on clinical trial data, patient eligibility, dosing information and safety profiles
2. Present eligibility criteria clearly
3. Give dosing schemas with precise dosages and schedules
4. Highlight safety notes, adverse events and contraindications
5. Reference trial phases, endpoints and outcomes when available
6. If the information is not in the provided context, say so plainly

Use the retrieved context to give accurate, evidence-based answers about clinical trials.",
    context_preamble: "Context from clinical documents:",
    question_lead: "Based on the above context, answer the following question:",
};

pub static MOA_TEMPLATE: PromptTemplate = PromptTemplate {
    name: "moa",
    system_prompt: "You are a pharmacology expert specialized in mechanisms of action, protein \
targets and drug interactions. When answering:

1. Explain mechanisms of action in detail, including molecular pathways
2. Identify protein targets, receptors, enzymes and signaling pathways
3. Explain how drugs interact with their targets at the molecular level
4. Describe downstream effects and biological consequences
5. Name specific proteins, pathways and molecular interactions when available
6. If the information is not in the provided context, say so plainly

Use the retrieved context to explain drug mechanisms and protein interactions accurately.",
    context_preamble: "Context from mechanism of action documents:",
    question_lead: "Based on the above context, answer the following question about mechanisms of action:",
};

pub static PROTEIN_TEMPLATE: PromptTemplate = PromptTemplate {
    name: "protein",
    system_prompt: "You are a protein biology expert specialized in protein targets, \
protein-protein interactions and therapeutic targeting. When answering:

1. Identify and describe protein targets in detail
2. Explain protein structure, function and biological role
3. Describe how drugs interact with protein targets
4. Explain protein-protein interactions and signaling networks
5. Name specific proteins, domains and interaction sites when available
6. If the information is not in the provided context, say so plainly

Use the retrieved context to give accurate information about protein targets and their therapeutic relevance.",
    context_preamble: "Context from protein target documents:",
    question_lead: "Based on the above context, answer the following question about protein targets:",
};

pub static REGULATORY_TEMPLATE: PromptTemplate = PromptTemplate {
    name: "regulatory",
    system_prompt: "You are a regulatory affairs expert specialized in FDA/EMA approvals, \
indications and regulatory documentation. When answering:

1. Give the FDA/EMA approval and regulatory status
2. List approved indications and therapeutic uses
3. Reference specific regulatory documents, guidelines and requirements
4. Explain regulatory pathways and approval processes
5. Include clinical trial phases and regulatory milestones when relevant
6. If the information is not in the provided context, say so plainly

Use the retrieved context to give accurate, current regulatory information.",
    context_preamble: "Context from regulatory documents:",
    question_lead: "Based on the above context, answer the following question about regulatory information:",
};

/// Template bound to `mode`.
pub fn template_for(mode: Mode) -> &'static PromptTemplate {
    match mode {
        Mode::Clinical => &CLINICAL_TEMPLATE,
        Mode::Moa => &MOA_TEMPLATE,
        Mode::Protein => &PROTEIN_TEMPLATE,
        Mode::Regulatory => &REGULATORY_TEMPLATE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mode_has_its_own_template() {
        for m in Mode::ALL {
            let t = template_for(m);
            assert_eq!(t.name, m.as_str());
            assert_ne!(t, &DEFAULT_TEMPLATE);
        }
    }

    #[test]
    fn context_rewrites_last_user_message() {
        let msgs = vec![
            ChatMessage::user("first question"),
            ChatMessage::assistant("first answer"),
            ChatMessage::user("What is the dose?"),
        ];
        let out = CLINICAL_TEMPLATE.format_messages(&msgs, Some("Dose: 100mg daily."));

        assert_eq!(out.len(), 4);
        assert_eq!(out[0].role, MessageRole::System);
        assert_eq!(out[0].content, CLINICAL_TEMPLATE.system_prompt);
        assert_eq!(out[1], msgs[0]);
        assert_eq!(out[2], msgs[1]);
        assert_eq!(
            out[3].content,
            "Context from clinical documents:\n\nDose: 100mg daily.\n\n\
             Based on the above context, answer the following question:\n\nWhat is the dose?"
        );
    }

    #[test]
    fn trailing_blank_user_turn_is_not_the_question() {
        let msgs = vec![
            ChatMessage::user("What is the dose?"),
            ChatMessage::user("   "),
        ];
        assert_eq!(question_index(&msgs), Some(0));

        let out = CLINICAL_TEMPLATE.format_messages(&msgs, Some("Dose: 100mg daily."));
        assert!(out[1].content.ends_with("What is the dose?"));
        assert!(out[1].content.starts_with("Context from clinical documents:"));
        assert_eq!(out[2], msgs[1]);
    }

    #[test]
    fn no_context_passes_messages_through() {
        let msgs = vec![ChatMessage::user("hello")];
        for ctx in [None, Some(""), Some("   ")] {
            let out = MOA_TEMPLATE.format_messages(&msgs, ctx);
            assert_eq!(out.len(), 2);
            assert_eq!(out[1], msgs[0]);
        }
    }

    #[test]
    fn trailing_assistant_message_keeps_order() {
        let msgs = vec![ChatMessage::user("q"), ChatMessage::assistant("partial")];
        let out = PROTEIN_TEMPLATE.format_messages(&msgs, Some("ctx"));
        assert!(out[1].content.ends_with("\n\nq"));
        assert_eq!(out[2], msgs[1]);
    }
}
