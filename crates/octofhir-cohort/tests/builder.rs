//! Builder tests against the serialized document

mod common;

use common::*;
use insta::assert_snapshot;
use octofhir_cohort::types::{CriteriaGroup, PSEUDONYMISED_ACCESS, PopulationRef};
use octofhir_cohort::{BuildOptions, CohortRequest, RequestBuilder};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn build_value(request: &CohortRequest) -> Value {
    let json = RequestBuilder::new().build(request).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn test_document_envelope() {
    let document = build_value(&sample_request());
    assert_eq!(document["version"], "v1.4.4");
    assert_eq!(document["_type"], "request");
    assert_eq!(document["sourcePopulation"], json!({"caresiteCohortList": ["10"]}));
    assert_eq!(document["request"]["_type"], "andGroup");
    assert_eq!(document["request"]["_id"], 0);
}

#[test]
fn test_tree_shape() {
    let document = build_value(&sample_request());
    let root = &document["request"];
    assert_eq!(root["criteria"][0]["resourceType"], "Patient");
    assert_eq!(root["criteria"][0]["name"], "Femmes adultes");
    assert_eq!(root["criteria"][0]["filterFhir"], "active=true&gender=f&age-day=ge6570");

    let nested = &root["criteria"][1];
    assert_eq!(nested["_type"], "nAmongM");
    assert_eq!(nested["_id"], -1);
    assert_eq!(nested["nAmongMOptions"], json!({"n": 2, "operator": ">="}));
    assert_eq!(nested["criteria"][2]["isInclusive"], false);
    assert_eq!(
        root["temporalConstraints"],
        json!([{"idList": [2, 3], "constraintType": "sameEncounter"}])
    );
}

#[test]
fn test_condition_context() {
    let document = build_value(&sample_request());
    let condition = &document["request"]["criteria"][1]["criteria"][1];
    assert_eq!(
        condition["filterFhir"],
        "subject.active=true\
         &code=https://terminology.eds.aphp.fr/aphp-orbis-cim|E10,https://terminology.eds.aphp.fr/aphp-orbis-cim|E11\
         &orbis-status=dp"
    );
    assert_eq!(condition["occurrence"], json!({"n": 2, "operator": ">="}));
    assert_eq!(
        condition["dateRangeList"],
        json!([{"minDate": "2020-01-01T00:00:00Z", "maxDate": "2020-12-31T00:00:00Z"}])
    );
}

#[test]
fn test_no_population_builds_nothing() {
    let mut request = sample_request();
    request.population = None;
    assert_eq!(RequestBuilder::new().build(&request).unwrap(), "");
}

#[test]
fn test_population_without_tree() {
    let request = CohortRequest::new(vec![Some(PopulationRef::new("1", "10")), None]);
    let document = build_value(&request);
    assert_eq!(document["sourcePopulation"]["caresiteCohortList"], json!(["10"]));
    assert!(document.get("request").is_none());
}

#[test]
fn test_custom_version_and_pretty_output() {
    let builder = RequestBuilder::with_options(BuildOptions {
        version: "v1.5.0".into(),
        pretty: true,
    });
    let json = builder.build(&sample_request()).unwrap();
    assert!(json.contains('\n'));
    assert!(json.contains("\"v1.5.0\""));
}

#[test]
fn test_empty_root_group() {
    let request = CohortRequest::new(vec![Some(PopulationRef::new("1", "10"))]).with_group(CriteriaGroup::root());
    let document = build_value(&request);
    assert_eq!(document["request"]["criteria"], json!([]));
}

#[test]
fn test_ipp_list_filter_is_bare() {
    let request = CohortRequest::new(vec![Some(PopulationRef::new("1", "10"))])
        .with_criterion(ipp_list(1))
        .with_group(CriteriaGroup::root().with_children([1]));
    let document = build_value(&request);
    let node = &document["request"]["criteria"][0];
    assert_eq!(node["resourceType"], "IPPList");
    assert_eq!(node["filterFhir"], "identifier.value=8000001,8000002");
    assert!(node.get("occurrence").is_none());
}

#[test]
fn test_patient_filter_follows_population_access() {
    let nominative = build_value(&sample_request());
    assert_snapshot!(
        nominative["request"]["criteria"][0]["filterFhir"].as_str().unwrap(),
        @"active=true&gender=f&age-day=ge6570"
    );

    let mut request = sample_request();
    request.population = Some(vec![Some(PopulationRef::new("2", "20").with_access(PSEUDONYMISED_ACCESS))]);
    let pseudonymised = build_value(&request);
    assert_snapshot!(
        pseudonymised["request"]["criteria"][0]["filterFhir"].as_str().unwrap(),
        @"active=true&gender=f&age-month=ge216"
    );
}
