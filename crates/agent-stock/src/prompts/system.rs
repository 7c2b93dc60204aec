//! System instruction shared by every model call

use agent_llm::Message;

/// Instruction placed ahead of the conversation on each call
pub const SYSTEM_INSTRUCTION: &str = "You are a financial analyst AI powered by Gemini.";

pub fn system_message() -> Message {
    Message::system(SYSTEM_INSTRUCTION)
}

/// Prefix the conversation with the system instruction
pub fn with_system_instruction(conversation: &[Message]) -> Vec<Message> {
    std::iter::once(system_message())
        .chain(conversation.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_llm::Role;

    #[test]
    fn test_system_instruction_comes_first() {
        let messages = with_system_instruction(&[Message::assistant("a"), Message::user("b")]);

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, SYSTEM_INSTRUCTION);
        assert_eq!(messages[2].content, "b");
    }
}
