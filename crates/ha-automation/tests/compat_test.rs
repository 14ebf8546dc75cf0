//! Compatibility tests against Home Assistant automation configs
//!
//! These tests use configurations in the shapes Home Assistant documents for
//! `automations.yaml`, `configuration.yaml` and blueprints, written in the
//! 2024.9 schema, and check the converted output and its properties.

use ha_automation::{ConvertOptions, Converter, Outcome, Stats};
use serde_yaml::Value;

fn keep() -> Converter {
    Converter::default()
}

fn plain() -> Converter {
    Converter::new(ConvertOptions {
        preserve_comments: false,
    })
}

// ============================================================================
// automations.yaml as written by the automation editor
// ============================================================================

const EDITOR_AUTOMATIONS: &str = r#"- id: '1700000000001'
  alias: Wake up
  description: ''
  trigger:
  - platform: time
    at: 07:00:00
  condition:
  - condition: state
    entity_id: binary_sensor.workday_sensor
    state: 'on'
  action:
  - service: light.turn_on
    metadata: {}
    data:
      brightness_pct: 40
    target:
      area_id: bedroom
  mode: single
- id: '1700000000002'
  alias: Notify when door opens
  trigger:
  - platform: state
    entity_id:
    - binary_sensor.front_door
    to: 'on'
  action:
  - service: notify.mobile_app
    data:
      message: Door opened
  mode: queued
"#;

#[test]
fn test_editor_compact_sequences() {
    let conversion = keep().convert_str(EDITOR_AUTOMATIONS).unwrap();

    assert_eq!(
        conversion.output,
        r#"- id: '1700000000001'
  alias: Wake up
  description: ''
  triggers:
  - trigger: time
    at: 07:00:00
  conditions:
  - condition: state
    entity_id: binary_sensor.workday_sensor
    state: 'on'
  actions:
  - service: light.turn_on
    metadata: {}
    data:
      brightness_pct: 40
    target:
      area_id: bedroom
  mode: single
- id: '1700000000002'
  alias: Notify when door opens
  triggers:
  - trigger: state
    entity_id:
    - binary_sensor.front_door
    to: 'on'
  actions:
  - service: notify.mobile_app
    data:
      message: Door opened
  mode: queued
"#
    );

    let names: Vec<_> = conversion
        .report
        .automations()
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(names, vec!["Wake up", "Notify when door opens"]);
    assert_eq!(
        conversion.report.stats(),
        Stats {
            converted: 2,
            up_to_date: 0,
            total: 2
        }
    );
}

#[test]
fn test_nested_condition_keys_stay_singular() {
    let source = r#"- alias: Nested
  trigger:
    - platform: state
      entity_id: sensor.a
  condition:
    - condition: or
      conditions:
        - condition: template
          value_template: "{{ trigger.to_state.state == 'on' }}"
  action:
    - choose:
        - conditions:
            - condition: trigger
              id: x
          sequence:
            - action: light.turn_on
      default:
        - delay: 5
"#;
    let conversion = keep().convert_str(source).unwrap();
    let out = &conversion.output;

    assert!(out.contains("  triggers:\n"));
    assert!(out.contains("  conditions:\n    - condition: or\n"));
    assert!(out.contains("        - condition: template\n"));
    assert!(out.contains("            - condition: trigger\n"));
    assert!(out.contains("            - action: light.turn_on\n"));
    assert!(out.contains("{{ trigger.to_state.state == 'on' }}"));
}

#[test]
fn test_block_scalars_are_untouched() {
    let source = r#"- alias: Template
  description: >
    trigger:
      platform: not a real key
  trigger:
    - platform: template
      value_template: |
        {% set condition = true %}
        {{ condition }}
  action:
    - service: script.turn_on
"#;
    let conversion = keep().convert_str(source).unwrap();
    let out = &conversion.output;

    assert!(out.contains("    trigger:\n      platform: not a real key\n"));
    assert!(out.contains("  triggers:\n    - trigger: template\n"));
    assert!(out.contains("        {% set condition = true %}\n"));
    assert!(!conversion.report.fell_back());
}

#[test]
fn test_byte_order_mark_keeps_comments() {
    let source = "\u{feff}# lights\n- alias: x\n  trigger:\n    - platform: state\n  action: []\n";
    let conversion = keep().convert_str(source).unwrap();

    assert!(!conversion.report.fell_back());
    assert_eq!(
        conversion.output,
        "\u{feff}# lights\n- alias: x\n  triggers:\n    - trigger: state\n  actions: []\n"
    );
}

#[test]
fn test_anchored_automation_keeps_layout() {
    let source = r#"- &porch
  alias: Porch
  trigger:
    - platform: sun   # dusk
      event: sunset
  action: []
"#;
    let conversion = keep().convert_str(source).unwrap();

    assert!(!conversion.report.fell_back());
    assert_eq!(
        conversion.output,
        r#"- &porch
  alias: Porch
  triggers:
    - trigger: sun   # dusk
      event: sunset
  actions: []
"#
    );
}

#[test]
fn test_wrapped_trigger_keeps_trailing_comment() {
    let source = r#"alias: Start
trigger:
  platform: time
  at: "07:00:00"
  # weekdays only
action: []
"#;
    let conversion = keep().convert_str(source).unwrap();

    assert!(!conversion.report.fell_back());
    assert_eq!(
        conversion.output,
        r#"alias: Start
triggers:
  - trigger: time
    at: "07:00:00"
    # weekdays only
actions: []
"#
    );
}

// ============================================================================
// Script sequences pulled in with !include
// ============================================================================

const SCRIPT_STEPS: &str = r#"# sequence: !include morning.yaml
- action: light.turn_on
  target:
    entity_id: light.kitchen
- condition: state
  entity_id: sun.sun
  state: below_horizon
- alias: Tell everyone
  action: notify.notify
  data:
    message: Good morning
"#;

#[test]
fn test_script_steps_are_not_automations() {
    for converter in [keep(), plain()] {
        let conversion = converter.convert_str(SCRIPT_STEPS).unwrap();
        assert_eq!(conversion.output, SCRIPT_STEPS);
        assert!(conversion.report.automations().is_empty());
    }
}

// ============================================================================
// Blueprints
// ============================================================================

#[test]
fn test_blueprint_single_document() {
    let source = r#"blueprint:
  name: Motion-activated light
  domain: automation
  input:
    motion_entity:
      name: Motion sensor
trigger:
  platform: state
  entity_id: !input motion_entity
  from: "off"
  to: "on"
action:
  - service: light.turn_on
"#;
    let conversion = keep().convert_str(source).unwrap();

    assert_eq!(
        conversion.output,
        r#"blueprint:
  name: Motion-activated light
  domain: automation
  input:
    motion_entity:
      name: Motion sensor
triggers:
  - trigger: state
    entity_id: !input motion_entity
    from: "off"
    to: "on"
actions:
  - service: light.turn_on
"#
    );
    assert_eq!(
        conversion.report.automations()[0].name,
        "Unnamed automation"
    );
}

// ============================================================================
// Properties
// ============================================================================

const CURRENT: &str = r#"# Converted by hand
- id: '1'
  alias: Already current
  triggers:
    - trigger: state  # door
      entity_id: binary_sensor.door
  conditions: []
  actions:
    - action: light.turn_on
"#;

#[test]
fn test_current_schema_output_equals_input() {
    let conversion = keep().convert_str(CURRENT).unwrap();
    assert_eq!(conversion.output, CURRENT);
    assert_eq!(
        conversion.report.automations()[0].outcome,
        Outcome::UpToDate
    );

    let plain = plain().convert_str(CURRENT).unwrap();
    assert_eq!(plain.output, CURRENT);
    let original: Value = serde_yaml::from_str(CURRENT).unwrap();
    assert_eq!(plain.value, original);
}

#[test]
fn test_conversion_is_idempotent() {
    for converter in [keep(), plain()] {
        let once = converter.convert_str(EDITOR_AUTOMATIONS).unwrap();
        let twice = converter.convert_str(&once.output).unwrap();

        assert_eq!(twice.output, once.output);
        assert_eq!(twice.value, once.value);
        assert!(!twice.report.has_changes());
    }
}

#[test]
fn test_wrapped_trigger_is_idempotent() {
    let source = "alias: Start\ntrigger:\n  platform: homeassistant\n  event: start\naction: []\n";
    let once = keep().convert_str(source).unwrap();
    let twice = keep().convert_str(&once.output).unwrap();
    assert_eq!(twice.output, once.output);
    assert!(!twice.report.has_changes());
}

#[test]
fn test_mixed_file_reports_both_outcomes() {
    let source = format!("{}{}", EDITOR_AUTOMATIONS, &CURRENT["# Converted by hand\n".len()..]);
    let conversion = keep().convert_str(&source).unwrap();
    assert_eq!(
        conversion.report.stats(),
        Stats {
            converted: 2,
            up_to_date: 1,
            total: 3
        }
    );
    assert_eq!(conversion.report.up_to_date().count(), 1);
}

#[test]
fn test_non_automation_documents_pass_through() {
    let source = "# lights\nlight:\n  - platform: hue\n    host: 192.168.1.2\n";
    let conversion = keep().convert_str(source).unwrap();
    assert_eq!(conversion.output, source);
    assert!(conversion.report.automations().is_empty());
}
