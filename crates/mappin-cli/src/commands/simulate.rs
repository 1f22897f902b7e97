//! Simulate command implementation
//!
//! Mounts the widget on an XHTML form with the recording map, replays a
//! script of inputs through the widget's input channel, and reports where
//! each slot ended up.

use crate::cli::SimulateArgs;
use crate::output::OutputWriter;
use crate::output_types::{SimulateOutput, SlotReport};
use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use mappin_core::config::LayeredConfig;
use mappin_core::input::WidgetInput;
use mappin_core::registry::XhtmlForm;
use mappin_widget::{RecordingMap, Widget};
use std::fs;
use tabled::Tabled;

const CONTAINER: &str = "mappin-simulation";

pub async fn execute(args: SimulateArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let form = XhtmlForm::from_file(&args.form)
        .with_context(|| format!("Failed to read form {}", args.form.display()))?;
    let script = load_script(&args)?;
    let geocoder = super::widget_geocoder(config, args.offline, output)?;

    let map = RecordingMap::new();
    let mut widget = Widget::mount(
        config.widget_config(CONTAINER),
        config.locale(),
        Box::new(map.clone()),
        geocoder,
        Box::new(form),
    )?;

    if widget.registry().is_empty() {
        output.warning("The form has no inputs; no pins will be created");
    }

    let sender = widget.sender();
    for input in script {
        match input {
            WidgetInput::Gesture { gesture } => map.emit(gesture)?,
            other => sender.send(other)?,
        }
    }
    sender.send(WidgetInput::Unmount)?;

    widget.run().await?;

    let report = build_report(&widget, &map);

    if args.geojson {
        output.raw(to_feature_collection(&report.slots));
        return Ok(());
    }

    if output.is_json() {
        return output.result(report);
    }

    print_report(&report, output);
    Ok(())
}

fn load_script(args: &SimulateArgs) -> Result<Vec<WidgetInput>> {
    let content = fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script {}", args.script.display()))?;
    let script: Vec<WidgetInput> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid script {}", args.script.display()))?;
    tracing::debug!("Loaded {} scripted inputs", script.len());
    Ok(script)
}

fn build_report(widget: &Widget, map: &RecordingMap) -> SimulateOutput {
    let state = widget.state();

    let slots = widget
        .registry()
        .entries()
        .iter()
        .zip(&state.slots)
        .enumerate()
        .map(|(index, (entry, slot))| SlotReport {
            index,
            label: entry.label.clone(),
            input: entry.input.to_string(),
            editable: slot.editable,
            location: slot.location,
            value: widget.input_value(index).filter(|value| !value.is_empty()),
        })
        .collect();

    SimulateOutput {
        form_location: format!("{:?}", widget.form_location()).to_lowercase(),
        viewport: state.viewport,
        click_cursor: state.click_cursor,
        revision: state.revision,
        map_calls: map.calls().len(),
        slots,
    }
}

/// Placed slots as point features, in [lng, lat] order
fn to_feature_collection(slots: &[SlotReport]) -> FeatureCollection {
    let features = slots
        .iter()
        .filter_map(|slot| {
            let location = slot.location?;
            let [lng, lat] = location.to_lng_lat();

            let mut properties = JsonObject::new();
            properties.insert("index".to_string(), slot.index.into());
            properties.insert("label".to_string(), slot.label.clone().into());
            properties.insert("editable".to_string(), slot.editable.into());
            if let Some(value) = &slot.value {
                properties.insert("address".to_string(), value.clone().into());
            }

            Some(Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![lng, lat]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            })
        })
        .collect();

    FeatureCollection { bbox: None, features, foreign_members: None }
}

fn print_report(report: &SimulateOutput, output: &OutputWriter) {
    #[derive(Tabled)]
    struct SlotRow {
        #[tabled(rename = "#")]
        index: usize,
        #[tabled(rename = "Label")]
        label: String,
        #[tabled(rename = "Editable")]
        editable: String,
        #[tabled(rename = "Location")]
        location: String,
        #[tabled(rename = "Input")]
        value: String,
    }

    output.section("Slots");
    let rows = report
        .slots
        .iter()
        .map(|slot| SlotRow {
            index: slot.index,
            label: slot.label.clone(),
            editable: if slot.editable { "✓" } else { "✗" }.to_string(),
            location: slot.location.map(|at| at.to_string()).unwrap_or_else(|| "-".to_string()),
            value: slot.value.clone().unwrap_or_default(),
        })
        .collect();
    output.table(rows);

    output.section("Map");
    output.kv("Center", report.viewport.center);
    output.kv("Zoom", report.viewport.zoom);
    output.kv(
        "Next click",
        report.click_cursor.map(|i| format!("slot {}", i)).unwrap_or_else(|| "none".to_string()),
    );
    output.kv("Map calls", report.map_calls);
    output.kv("Revision", report.revision);

    let placed = report.slots.iter().filter(|slot| slot.location.is_some()).count();
    output.success(format!("{} of {} pins placed", placed, report.slots.len()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use mappin_core::models::Coordinate;

    fn slot(index: usize, location: Option<Coordinate>) -> SlotReport {
        SlotReport {
            index,
            label: format!("Stop {}", index),
            input: format!("stop-{}", index),
            editable: true,
            location,
            value: location.map(|at| at.to_string()),
        }
    }

    #[test]
    fn test_feature_collection_skips_unplaced_slots() {
        let at = Coordinate::new(48.8606, 2.3376).unwrap();
        let collection = to_feature_collection(&[slot(0, None), slot(1, Some(at))]);

        assert_eq!(collection.features.len(), 1);
        let feature = &collection.features[0];
        match &feature.geometry.as_ref().unwrap().value {
            Value::Point(position) => assert_eq!(position, &vec![2.3376, 48.8606]),
            other => panic!("expected a point, got {:?}", other),
        }
        let properties = feature.properties.as_ref().unwrap();
        assert_eq!(properties["index"], 1);
        assert_eq!(properties["label"], "Stop 1");
    }
}
