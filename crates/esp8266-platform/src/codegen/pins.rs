//! Boot-time GPIO state arrays.

use crate::codegen::directives::Directives;
use crate::codegen::expr::Expression;
use crate::context::{BuildContext, PinInitialState};

/// Array entry for a GPIO nobody configured.
const UNSET: &str = "255";

/// Emit the initial mode and level arrays from the closed pin-state table.
pub fn emit_pin_arrays(ctx: &BuildContext, out: &mut Directives) {
    let states = ctx.pin_states();
    let modes = render(states, |s| s.mode.arduino_constant().to_string());
    let levels = render(states, |s| u8::from(s.level).to_string());

    out.add_global(Expression::raw(format!(
        "const uint8_t ESPHOME_ESP8266_GPIO_INITIAL_MODE[{}] = {{{modes}}}",
        states.len()
    )));
    out.add_global(Expression::raw(format!(
        "const uint8_t ESPHOME_ESP8266_GPIO_INITIAL_LEVEL[{}] = {{{levels}}}",
        states.len()
    )));
}

fn render(states: &[Option<PinInitialState>], f: impl Fn(&PinInitialState) -> String) -> String {
    states
        .iter()
        .map(|slot| slot.as_ref().map_or_else(|| UNSET.to_string(), &f))
        .collect::<Vec<_>>()
        .join(", ")
}
