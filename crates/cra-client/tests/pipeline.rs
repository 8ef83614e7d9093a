//! End-to-end analysis over the HTTP client with scripted responses

use cra_client::HttpResponse;
use cra_core::{ClimateError, ConfigurationError, Credentials, ImpactAnalyzer, Location};
use cra_test_utils::{
    alba, sample_statistics, scenario_of, scripted_client, statistics_body, test_credentials,
    ScriptedTransport, TEST_GRAPHQL_URL, TEST_TOKEN, TEST_TOKEN_URL,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn analyzer(transport: &Arc<ScriptedTransport>, credentials: Credentials) -> ImpactAnalyzer {
    ImpactAnalyzer::new(Arc::new(scripted_client(Arc::clone(transport))), credentials)
}

#[tokio::test]
async fn truffle_analysis_queries_each_sensitive_scenario() {
    let transport = Arc::new(ScriptedTransport::provider());
    let analysis = analyzer(&transport, test_credentials())
        .analyze("truffle", &alba())
        .await
        .unwrap();

    let scenarios: Vec<_> = analysis
        .climate_risks()
        .scenarios()
        .map(|s| s.as_str().to_string())
        .collect();
    assert_eq!(scenarios, ["3.0", "4.0"]);
    assert_eq!(
        analysis.climate_risks()["3.0"],
        Ok(sample_statistics("3.0"))
    );
    assert!(analysis.recommendation().starts_with("Truffle farming"));

    // one token exchange and one query per scenario
    assert_eq!(transport.calls(), 4);
    assert_eq!(transport.calls_to(TEST_TOKEN_URL), 2);
    assert_eq!(transport.calls_to(TEST_GRAPHQL_URL), 2);
}

#[tokio::test]
async fn queries_carry_bearer_token() {
    let transport = Arc::new(ScriptedTransport::provider());
    analyzer(&transport, test_credentials())
        .analyze("saffron", &alba())
        .await
        .unwrap();

    for request in transport.requests() {
        if request.url == TEST_GRAPHQL_URL {
            assert_eq!(request.bearer_token.as_deref(), Some(TEST_TOKEN));
        } else {
            assert_eq!(request.bearer_token, None);
            assert_eq!(request.body["client_id"], "test-client");
        }
    }
}

#[tokio::test]
async fn server_error_on_one_scenario_is_isolated() {
    let transport = Arc::new(
        ScriptedTransport::provider().route(TEST_GRAPHQL_URL, |request| {
            let scenario = scenario_of(request).unwrap_or_default();
            if scenario == "2.0" {
                Ok(HttpResponse::new(500, "internal error"))
            } else {
                Ok(HttpResponse::new(200, statistics_body(&sample_statistics(&scenario))))
            }
        }),
    );

    let batch = analyzer(&transport, test_credentials())
        .project(&alba(), &[])
        .await
        .unwrap();

    assert_eq!(batch.len(), 3);
    assert_eq!(batch["1.5"], Ok(sample_statistics("1.5")));
    assert_eq!(batch["3.0"], Ok(sample_statistics("3.0")));
    assert_eq!(
        batch["2.0"],
        Err(ClimateError::http_status(500, "internal error").to_string())
    );
}

#[tokio::test]
async fn rejected_token_fails_every_scenario_but_not_the_analysis() {
    let transport = Arc::new(ScriptedTransport::provider().route(TEST_TOKEN_URL, |_| {
        Ok(HttpResponse::new(403, r#"{"error":"unauthorized_client"}"#))
    }));

    let analysis = analyzer(&transport, test_credentials())
        .analyze("ice_wine", &alba())
        .await
        .unwrap();

    assert_eq!(analysis.climate_risks().len(), 2);
    for (_, outcome) in analysis.climate_risks() {
        let message = outcome.as_ref().unwrap_err();
        assert!(message.starts_with("authentication failed"), "{message}");
    }
    assert_eq!(transport.calls_to(TEST_GRAPHQL_URL), 0);
    assert!(analysis.recommendation().contains("provisional"));
}

#[tokio::test]
async fn blank_client_id_makes_no_requests() {
    let transport = Arc::new(ScriptedTransport::provider());
    let err = analyzer(&transport, Credentials::new("", "secret"))
        .analyze("truffle", &alba())
        .await
        .unwrap_err();

    assert_eq!(err, ConfigurationError::MissingClientId);
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn location_text_is_sent_as_variables() {
    let transport = Arc::new(ScriptedTransport::provider());
    let hostile = Location::new(r#"Alba" }) { __typename } #"#, "Italy");
    analyzer(&transport, test_credentials())
        .analyze("unknown crop", &hostile)
        .await
        .unwrap();

    let query = transport
        .requests()
        .into_iter()
        .find(|r| r.url == TEST_GRAPHQL_URL)
        .unwrap();
    assert_eq!(query.body["variables"]["address"], hostile.address());
    assert!(!query.body["query"].as_str().unwrap().contains("__typename"));
}

#[tokio::test]
async fn repeated_analyses_are_identical() {
    let transport = Arc::new(ScriptedTransport::provider());
    let analyzer = analyzer(&transport, test_credentials());

    let first = analyzer.analyze("Saffron", &alba()).await.unwrap();
    let second = analyzer.analyze("Saffron", &alba()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(transport.calls(), 8);
}
