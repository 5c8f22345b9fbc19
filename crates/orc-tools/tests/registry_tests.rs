use orc_tools::ToolRegistry;
use serde_json::json;

#[tokio::test]
async fn ensure_capabilities_registers_every_known_tool() {
    let registry = ToolRegistry::new();
    registry.ensure_capabilities().await;

    let catalog = registry.list_tools().await;
    for name in orc_constants::all_tool_names() {
        assert!(catalog.contains_key(name), "missing tool '{name}' in catalog");
    }
}

#[tokio::test]
async fn ensure_capabilities_is_idempotent() {
    let registry = ToolRegistry::new();
    registry.ensure_capabilities().await;
    registry.ensure_capabilities().await;

    assert_eq!(
        registry.list_tools().await.len(),
        orc_constants::all_tool_names().len()
    );
}

#[tokio::test]
async fn invoke_unknown_tool_returns_none() {
    let registry = ToolRegistry::new();
    registry.ensure_capabilities().await;

    let result = registry.invoke("not-a-real-tool", json!({})).await;
    assert!(result.is_none());
}

#[tokio::test]
async fn create_vpc_returns_a_vpc_id() {
    let registry = ToolRegistry::new();
    registry.ensure_capabilities().await;

    let response = registry
        .invoke("create-vpc", json!({ "cidr_block": "10.0.0.0/16" }))
        .await
        .expect("tool registered")
        .expect("tool call succeeds");

    assert!(response["vpcId"].as_str().unwrap().starts_with("vpc-"));
}

#[tokio::test]
async fn create_vpc_missing_cidr_block_is_an_error() {
    let registry = ToolRegistry::new();
    registry.ensure_capabilities().await;

    let result = registry
        .invoke("create-vpc", json!({}))
        .await
        .expect("tool registered");

    assert!(result.is_err());
}

#[tokio::test]
async fn describe_nat_gateways_reports_pending_then_available() {
    let registry = ToolRegistry::new();
    registry.ensure_capabilities().await;

    let args = json!({ "nat_gateway_id": "nat-test" });

    let first = registry
        .invoke("describe-nat-gateways", args.clone())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first["natGateways"][0]["state"], "pending");

    let second = registry
        .invoke("describe-nat-gateways", args)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second["natGateways"][0]["state"], "available");
}
