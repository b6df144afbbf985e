//! Scan configuration: pass colours, pulse animation and pass toggles.
//!
//! Every field has a default, so a partial file (or none at all) yields a
//! working configuration.

use crate::render::Color;
use crate::traversal::{Commodity, FlowDirection};
use serde::{Deserialize, Serialize};

/// Fixed colour per (direction, commodity) pass, plus the focal highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanColors {
    pub item_output: Color,
    pub item_input: Color,
    pub liquid_output: Color,
    pub liquid_input: Color,
    pub accent: Color,
}

impl Default for ScanColors {
    fn default() -> Self {
        Self {
            item_output: Color::rgb(0x80, 0xff, 0x00),
            item_input: Color::rgb(0xff, 0x80, 0x00),
            liquid_output: Color::rgb(0x00, 0xff, 0xff),
            liquid_input: Color::rgb(0x40, 0x80, 0xff),
            accent: Color::rgb(0xff, 0xd3, 0x7f),
        }
    }
}

impl ScanColors {
    pub fn for_pass(&self, direction: FlowDirection, commodity: Commodity) -> Color {
        match (direction, commodity) {
            (FlowDirection::Outbound, Commodity::Item) => self.item_output,
            (FlowDirection::Inbound, Commodity::Item) => self.item_input,
            (FlowDirection::Outbound, Commodity::Liquid) => self.liquid_output,
            (FlowDirection::Inbound, Commodity::Liquid) => self.liquid_input,
        }
    }
}

/// Edge alpha pulse: `|sin(time / period)| * amplitude + base`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Period scale in ticks. Non-positive disables the pulse.
    pub period: f32,
    pub amplitude: f32,
    pub base: f32,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            period: 4.0,
            amplitude: 0.4,
            base: 0.6,
        }
    }
}

impl PulseConfig {
    /// Alpha factor at `time`, clamped to `[0, 1]`.
    pub fn alpha(&self, time: f32) -> f32 {
        if self.period <= 0.0 {
            return self.base.clamp(0.0, 1.0);
        }
        ((time / self.period).sin().abs() * self.amplitude + self.base).clamp(0.0, 1.0)
    }
}

/// Which of the four passes run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassToggles {
    pub item: bool,
    pub liquid: bool,
    pub outbound: bool,
    pub inbound: bool,
}

impl Default for PassToggles {
    fn default() -> Self {
        Self {
            item: true,
            liquid: true,
            outbound: true,
            inbound: true,
        }
    }
}

impl PassToggles {
    pub fn enabled(&self, direction: FlowDirection, commodity: Commodity) -> bool {
        let direction_on = match direction {
            FlowDirection::Outbound => self.outbound,
            FlowDirection::Inbound => self.inbound,
        };
        let commodity_on = match commodity {
            Commodity::Item => self.item,
            Commodity::Liquid => self.liquid,
        };
        direction_on && commodity_on
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub colors: ScanColors,
    pub pulse: PulseConfig,
    pub passes: PassToggles,
}
