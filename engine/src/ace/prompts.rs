//! Prompt templates for the ACE stages
//!
//! All prompts are plain-text and single-turn. The system prompt, query and
//! accumulated memory are wrapped in XML-style tags so the model can tell them
//! apart from the instructions.

use super::memory::ContextMemory;
use super::types::{Insights, Trajectory};

pub fn generator_prompt(system_prompt: &str, query: &str, memory: &ContextMemory) -> String {
    format!(
        "<SYSTEM_PROMPT> {} </SYSTEM_PROMPT> <QUERY> {} </QUERY> \
         <CONTEXT_MEMORY> {} </CONTEXT_MEMORY>\n\
         Produce a trajectory for answering the query properly: a list of strategies \
         you would follow to answer it, informed by the context memory.\n\
         Output the trajectory as a single comma-delimited list of strategies so it can \
         be split into a list. Do not use commas inside a strategy.",
        system_prompt,
        query,
        memory.joined_contents()
    )
}

pub fn reflector_prompt(system_prompt: &str, trajectory: &Trajectory) -> String {
    format!(
        "<SYSTEM_PROMPT> {} </SYSTEM_PROMPT>\n\
         You are an expert at interpreting complex user queries for AI systems.\n\
         Extract insights and lessons learned from this trajectory: \
         <TRAJECTORY>{}</TRAJECTORY>\n\
         The insights will be handed to a curator that turns them into context items \
         clarifying the query, so keep each insight self-contained.\n\
         Output the insights as a single comma-delimited list so it can be split into a list.",
        system_prompt,
        trajectory.joined()
    )
}

pub fn curator_prompt(system_prompt: &str, insights: &Insights) -> String {
    format!(
        "<SYSTEM_PROMPT> {} </SYSTEM_PROMPT>\n\
         You are an expert at interpreting complex user queries for AI systems.\n\
         Turn these insights into delta context items to add to the agent's memory: \
         <INSIGHTS>{}</INSIGHTS>\n\
         Each context item should ground or improve the agent's ability to answer the query.\n\
         Output the context items as a single comma-delimited list so it can be split into a list.",
        system_prompt,
        insights.joined()
    )
}

pub fn final_response_prompt(system_prompt: &str, query: &str, memory: &ContextMemory) -> String {
    format!(
        "You are a helpful assistant answering a query.\n\
         <SYSTEM_PROMPT>{}</SYSTEM_PROMPT><QUERY>{}</QUERY>\n\
         Compiled context memory: {}\n\
         Give the final response to the query. Provide just the answer, using the \
         system prompt and the compiled context memory.",
        system_prompt,
        query,
        memory.joined_contents()
    )
}

pub fn revised_prompt_prompt(
    system_prompt: &str,
    query: &str,
    memory: &ContextMemory,
    final_response: &str,
) -> String {
    format!(
        "You are a helpful assistant that maintains system prompts.\n\
         <SYSTEM_PROMPT>{}</SYSTEM_PROMPT><QUERY>{}</QUERY>\n\
         Compiled context memory: {}\n\
         Final response given: {}\n\
         Write a revised system prompt that takes the compiled memory, the final response \
         and the original system prompt into account. Preserve the original intent and \
         make only minimal edits that better reflect what was learned about this query. \
         Output only the revised system prompt.",
        system_prompt,
        query,
        memory.joined_contents(),
        final_response
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ace::types::ContextItem;

    #[test]
    fn test_generator_prompt_embeds_all_inputs() {
        let mut memory = ContextMemory::new();
        memory.push(ContextItem::concept("capitals are cities"));
        memory.push(ContextItem::concept("France is in Europe"));

        let prompt = generator_prompt("You are a tutor.", "Capital of France?", &memory);
        assert!(prompt.contains("<SYSTEM_PROMPT> You are a tutor. </SYSTEM_PROMPT>"));
        assert!(prompt.contains("<QUERY> Capital of France? </QUERY>"));
        assert!(prompt.contains("capitals are cities, France is in Europe"));
        assert!(prompt.contains("comma-delimited"));
    }

    #[test]
    fn test_reflector_prompt_joins_reasoning() {
        let trajectory = Trajectory::new(vec!["recall".to_string(), "answer".to_string()]);
        let prompt = reflector_prompt("sp", &trajectory);
        assert!(prompt.contains("<TRAJECTORY>recall, answer</TRAJECTORY>"));
    }

    #[test]
    fn test_curator_prompt_joins_insights() {
        let insights = Insights::new(vec!["be brief".to_string(), "cite".to_string()]);
        let prompt = curator_prompt("sp", &insights);
        assert!(prompt.contains("<INSIGHTS>be brief, cite</INSIGHTS>"));
    }

    #[test]
    fn test_revised_prompt_includes_final_response() {
        let prompt = revised_prompt_prompt("sp", "q", &ContextMemory::new(), "Paris");
        assert!(prompt.contains("Final response given: Paris"));
        assert!(prompt.contains("Preserve the original intent"));
    }
}
