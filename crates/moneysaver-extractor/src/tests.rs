//! Retry-loop behaviour of the Extractor against a scripted provider

use crate::{ExtractionContext, Extractor, ExtractorConfig, ExtractorError};
use moneysaver_domain::{AssistantActionType, AssistantActionView, TransactionView};
use moneysaver_llm::MockProvider;
use std::time::Duration;

const LUNCH_AMOUNT_ZERO: &str =
    r#"{"transaction_type":"expense","amount":0,"item":{"name":"lunch","description":"","category":"food"}}"#;
const LUNCH_VALID: &str =
    r#"{"transaction_type":"expense","amount":12,"item":{"name":"lunch","description":"","category":"food"}}"#;

fn extractor(provider: &MockProvider) -> Extractor<MockProvider> {
    Extractor::new(provider.clone(), ExtractorConfig::default())
}

#[tokio::test]
async fn test_lunch_corrected_on_second_attempt() {
    let provider = MockProvider::scripted([LUNCH_AMOUNT_ZERO, LUNCH_VALID]);
    let mut view = TransactionView::default();

    let report = extractor(&provider)
        .extract(&ExtractionContext::new(), &mut view, "I spent $12 on lunch")
        .await
        .unwrap();

    assert_eq!(report.attempts, 2);
    assert_eq!(provider.call_count(), 2);
    assert_eq!(view.amount, 12);
    assert_eq!(view.transaction_type, "expense");
    assert_eq!(view.item.unwrap().name, "lunch");
}

#[tokio::test]
async fn test_feedback_reaches_next_prompt() {
    let provider = MockProvider::scripted([LUNCH_AMOUNT_ZERO, LUNCH_VALID]);
    let mut view = TransactionView::default();

    extractor(&provider)
        .extract(&ExtractionContext::new(), &mut view, "I spent $12 on lunch")
        .await
        .unwrap();

    let prompts = provider.prompts();
    assert!(prompts[0].ends_with("Error Scratch Pad:\n\n"));
    assert!(prompts[1].ends_with(
        "Error Scratch Pad:\nmodel validation failed: amount should be greater than 0, extract from the prompt\n"
    ));
    assert!(prompts[1].contains("I spent $12 on lunch"));
}

#[tokio::test]
async fn test_always_failing_provider_exhausts_budget() {
    let provider = MockProvider::new("not json at all");
    let config = ExtractorConfig {
        max_attempts: 3,
        ..ExtractorConfig::default()
    };
    let extractor = Extractor::new(provider.clone(), config);
    let mut view = TransactionView::default();

    let err = extractor
        .extract(&ExtractionContext::new(), &mut view, "I spent $12 on lunch")
        .await
        .unwrap_err();

    let ExtractorError::BudgetExhausted { attempts, last_error } = err else {
        panic!("expected budget exhaustion, got {:?}", err);
    };
    assert_eq!(attempts, 3);
    assert!(last_error.starts_with("failed to decode model response:"));
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn test_success_after_exactly_k_plus_one_calls() {
    for k in 0..5 {
        let provider = MockProvider::default();
        for _ in 0..k {
            provider.push_response(LUNCH_AMOUNT_ZERO);
        }
        provider.push_response(LUNCH_VALID);
        let mut view = TransactionView::default();

        let report = extractor(&provider)
            .extract(&ExtractionContext::new(), &mut view, "lunch 12")
            .await
            .unwrap();

        assert_eq!(report.attempts, k + 1);
        assert_eq!(provider.call_count(), (k + 1) as usize);
    }
}

#[tokio::test]
async fn test_every_prompt_carries_previous_failure() {
    let provider = MockProvider::default();
    provider.push_error("connection reset");
    provider.push_response("```json\n{oops\n```");
    provider.push_response(r#"{"transaction_type":"unknown","amount":12,"item":{"name":"lunch"}}"#);
    provider.push_response(LUNCH_VALID);
    let mut view = TransactionView::default();

    extractor(&provider)
        .extract(&ExtractionContext::new(), &mut view, "lunch 12")
        .await
        .unwrap();

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 4);
    assert!(prompts[1].contains("Error Scratch Pad:\ncompletion failed: Communication error: connection reset\n"));
    assert!(prompts[2].contains("Error Scratch Pad:\nfailed to decode model response:"));
    assert!(prompts[3].contains(
        "Error Scratch Pad:\nmodel validation failed: invalid transaction type: 'unknown', expected one of 'expense', 'revenue'\n"
    ));
}

#[tokio::test]
async fn test_target_untouched_on_failure() {
    let provider = MockProvider::new(LUNCH_AMOUNT_ZERO);
    let mut view = TransactionView::new("revenue", 99, "salary");

    let result = extractor(&provider)
        .extract_with_attempts(&ExtractionContext::new(), &mut view, "lunch", 2)
        .await;

    assert!(matches!(result, Err(ExtractorError::BudgetExhausted { attempts: 2, .. })));
    assert_eq!(view, TransactionView::new("revenue", 99, "salary"));
}

#[tokio::test]
async fn test_cancelled_context_makes_no_calls() {
    let provider = MockProvider::new(LUNCH_VALID);
    let ctx = ExtractionContext::new();
    ctx.cancel();
    let mut view = TransactionView::default();

    let result = extractor(&provider).extract(&ctx, &mut view, "lunch").await;

    assert_eq!(result, Err(ExtractorError::Cancelled));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_call_timeout_consumes_an_attempt() {
    let provider = MockProvider::new(LUNCH_VALID).with_delay(Duration::from_secs(60));
    let config = ExtractorConfig {
        max_attempts: 2,
        call_timeout_secs: 1,
        ..ExtractorConfig::default()
    };
    let extractor = Extractor::new(provider.clone(), config);
    let mut view = TransactionView::default();

    let err = extractor
        .extract(&ExtractionContext::new(), &mut view, "lunch")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ExtractorError::BudgetExhausted {
            attempts: 2,
            last_error: "completion failed: completion timed out after 1s".to_string(),
        }
    );
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_during_call_stops_the_loop() {
    let provider = MockProvider::new(LUNCH_VALID).with_delay(Duration::from_secs(60));
    let ctx = ExtractionContext::with_timeout(Duration::from_secs(5));
    let mut view = TransactionView::default();

    let result = extractor(&provider).extract(&ctx, &mut view, "lunch").await;

    assert_eq!(result, Err(ExtractorError::Cancelled));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_during_last_attempt_is_cancelled() {
    let provider = MockProvider::new(LUNCH_VALID).with_delay(Duration::from_secs(60));
    let ctx = ExtractionContext::with_timeout(Duration::from_secs(5));
    let mut view = TransactionView::default();

    let result = extractor(&provider)
        .extract_with_attempts(&ctx, &mut view, "lunch", 1)
        .await;

    assert_eq!(result, Err(ExtractorError::Cancelled));
    assert_eq!(provider.call_count(), 1);
    assert_eq!(view, TransactionView::default());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_last_attempt_is_cancelled() {
    let provider = MockProvider::new(LUNCH_VALID).with_delay(Duration::from_secs(60));
    let ctx = ExtractionContext::new();
    let mut view = TransactionView::default();

    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let result = extractor(&provider)
        .extract_with_attempts(&ctx, &mut view, "lunch", 1)
        .await;

    assert_eq!(result, Err(ExtractorError::Cancelled));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_classify_action() {
    let provider = MockProvider::scripted([r#"{"action_type":"Shopping"}"#, r#"{"action_type":"Reporting"}"#]);
    let mut view = AssistantActionView::default();

    let report = extractor(&provider)
        .extract(&ExtractionContext::new(), &mut view, "Show me last month's spending")
        .await
        .unwrap();

    assert_eq!(report.attempts, 2);
    assert_eq!(view.action(), Some(AssistantActionType::Reporting));
    assert!(provider.prompts()[1].contains("invalid action type: 'Shopping'"));
}
