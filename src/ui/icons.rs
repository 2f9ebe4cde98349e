//! Emoji used by the terminal output, with plain-text fallbacks.

use console::Emoji;

pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static DOWN: Emoji<'_, '_> = Emoji("⬇️  ", "[PULL]");
pub static GEAR: Emoji<'_, '_> = Emoji("⚙️  ", "");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[WARN]");
