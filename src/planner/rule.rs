//! 规则 Planner
//!
//! inputs 含 order_id 时返回固定三步订单计划（库存检查 → 支付 → 状态通知），
//! 否则返回引用 goal 的通用三步计划。步骤只在 inputs 提供了足够参数时才绑定工具：
//! - 库存检查：inputs.inventory = {sku, delta} → adjust_inventory
//! - 支付：inputs.amount 为数字 → charge_payment（method 默认 card）
//! - 通知：inputs.notify_to 为字符串 → send_notification

use serde_json::{json, Value};

use crate::planner::{Inputs, Plan, Planner, Step};

/// 默认规划策略
#[derive(Debug, Default, Clone)]
pub struct RulePlanner;

impl RulePlanner {
    pub fn new() -> Self {
        Self
    }
}

/// order_id 可能是字符串或数字，统一成展示文本
fn order_ref(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn inventory_step(oid: &str, inputs: &Inputs) -> Step {
    let step = Step::describe(format!("Check inventory for items in order {oid}"));
    let Some(adj) = inputs.get("inventory").and_then(|v| v.as_object()) else {
        return step;
    };
    match (
        adj.get("sku").and_then(|v| v.as_str()),
        adj.get("delta").and_then(|v| v.as_i64()),
    ) {
        (Some(sku), Some(delta)) => {
            step.with_tool("adjust_inventory", json!({ "sku": sku, "delta": delta }))
        }
        _ => step,
    }
}

fn payment_step(oid: &str, inputs: &Inputs) -> Step {
    let step = Step::describe(format!("Process payment for order {oid}"));
    let Some(amount) = inputs.get("amount").and_then(|v| v.as_f64()) else {
        return step;
    };
    let method = inputs
        .get("method")
        .and_then(|v| v.as_str())
        .unwrap_or("card");
    step.with_tool(
        "charge_payment",
        json!({ "order_id": oid, "amount": amount, "method": method }),
    )
}

fn notify_step(oid: &str, inputs: &Inputs) -> Step {
    let step = Step::describe(format!("Notify user of order {oid} status"));
    let Some(to) = inputs.get("notify_to").and_then(|v| v.as_str()) else {
        return step;
    };
    step.with_tool(
        "send_notification",
        json!({
            "to": to,
            "subject": format!("Order {oid} status"),
            "body": format!("Your order {oid} has been processed."),
        }),
    )
}

impl Planner for RulePlanner {
    fn plan(&self, goal: &str, inputs: &Inputs) -> Plan {
        if let Some(value) = inputs.get("order_id") {
            let oid = order_ref(value);
            return Plan::new(vec![
                inventory_step(&oid, inputs),
                payment_step(&oid, inputs),
                notify_step(&oid, inputs),
            ]);
        }
        Plan::new(vec![
            Step::describe(format!("Break down goal '{goal}' into actionable steps")),
            Step::describe("Call appropriate service APIs"),
            Step::describe("Return summarized result"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(v: Value) -> Inputs {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_order_plan_fixed_order() {
        let plan = RulePlanner.plan("ship it", &inputs(json!({ "order_id": "123" })));
        assert_eq!(plan.len(), 3);
        assert!(plan.steps.iter().all(|s| s.description.contains("123")));
        let d = plan.descriptions();
        assert!(d[0].starts_with("Check inventory"));
        assert!(d[1].starts_with("Process payment"));
        assert!(d[2].starts_with("Notify user"));
        assert!(plan.steps.iter().all(|s| s.tool.is_none()));
    }

    #[test]
    fn test_fallback_plan_references_goal() {
        let plan = RulePlanner.plan("restock widgets", &Inputs::new());
        assert_eq!(plan.len(), 3);
        assert!(plan.steps[0].description.contains("restock widgets"));
        assert!(plan.steps.iter().all(|s| s.tool.is_none()));
    }

    #[test]
    fn test_unrecognized_inputs_fall_through() {
        let plan = RulePlanner.plan("g", &inputs(json!({ "amount": 10, "foo": [1, 2] })));
        assert_eq!(plan.steps[0].description, "Break down goal 'g' into actionable steps");
    }

    #[test]
    fn test_plan_is_deterministic() {
        let i = inputs(json!({ "order_id": 42, "amount": 9.5, "notify_to": "a@b.c" }));
        assert_eq!(RulePlanner.plan("g", &i), RulePlanner.plan("g", &i));
        let empty = Inputs::new();
        assert_eq!(RulePlanner.plan("g", &empty), RulePlanner.plan("g", &empty));
    }

    #[test]
    fn test_numeric_order_id() {
        let plan = RulePlanner.plan("g", &inputs(json!({ "order_id": 7 })));
        assert_eq!(plan.steps[1].description, "Process payment for order 7");
    }

    #[test]
    fn test_bindings_from_inputs() {
        let plan = RulePlanner.plan(
            "g",
            &inputs(json!({
                "order_id": "ord-1",
                "amount": 25.0,
                "notify_to": "alice@example.com",
                "inventory": { "sku": "SKU-1", "delta": -2 }
            })),
        );
        let tools: Vec<&str> = plan
            .steps
            .iter()
            .filter_map(|s| s.tool.as_ref().map(|t| t.tool.as_str()))
            .collect();
        assert_eq!(tools, vec!["adjust_inventory", "charge_payment", "send_notification"]);
        let pay = plan.steps[1].tool.as_ref().unwrap();
        assert_eq!(pay.args["method"], "card");
        assert_eq!(pay.args["order_id"], "ord-1");
        assert_eq!(plan.steps[0].tool.as_ref().unwrap().args["delta"], -2);
    }

    #[test]
    fn test_incomplete_inventory_input_leaves_step_unbound() {
        let plan = RulePlanner.plan(
            "g",
            &inputs(json!({ "order_id": "1", "inventory": { "sku": "SKU-1" } })),
        );
        assert!(plan.steps[0].tool.is_none());
    }
}
