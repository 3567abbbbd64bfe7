use proptest::prelude::*;
use sdk::errors::{CompletionError, EngineError, ErrorExt, Stage};

// User hints never echo the raw message carried by the error
proptest! {
    #[test]
    fn test_error_user_hint_completeness(error_str in "[a-zA-Z0-9 _./-]{8,64}") {
        let errs = vec![
            EngineError::Validation(error_str.clone()),
            EngineError::Storage(error_str.clone()),
            EngineError::Config(error_str.clone()),
            EngineError::TaskFailed(error_str.clone()),
            EngineError::Parse { stage: Stage::Curator, message: error_str.clone() },
            EngineError::completion(Stage::Generator, CompletionError::NetworkError(error_str.clone())),
            EngineError::completion(Stage::Reflector, CompletionError::AuthenticationFailed(error_str.clone())),
        ];

        for err in errs {
            let hint = err.user_hint();
            prop_assert!(!hint.is_empty());
            prop_assert!(!hint.contains(&error_str));
        }
    }
}
