//! ABSwitch: A/B comparison CLAP plugin.
//!
//! Up to 32 choices on one wide input bus, cross-faded to the output.
//! Exclusive mode solos one choice; toggle mode sums any number of them.
//!
//! Build: `cargo build -p abswitch-plugin --example abswitch`
//! Output: `target/debug/examples/libabswitch.so` (rename to `.clap`)

clack_plugin::clack_export_entry!(
    clack_plugin::prelude::SinglePluginEntry<abswitch_plugin::ABSwitchPlugin>
);
