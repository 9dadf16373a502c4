//! Integration tests for abswitch-core.
//!
//! Drives the policy, registry and router together the way the plugin does
//! per block: requests go through the selection policy, ramp targets follow,
//! and the router fades and sums the channel groups.

use abswitch_core::{
    ActivationOrigin, ActivationRequest, ChoiceRegistry, MAX_CHOICES, PlanarBlock, RouteConfig,
    SelectionMode, SelectionPolicy, params, route_block,
};

const SAMPLE_RATE: f32 = 48000.0;

/// Planar buffer where every sample of channel `ch` equals `ch + 1`.
fn channel_ramp(channels: usize, frames: usize) -> Vec<f32> {
    (0..channels * frames)
        .map(|i| (i / frames) as f32 + 1.0)
        .collect()
}

fn route(registry: &mut ChoiceRegistry, config: RouteConfig, data: &mut [f32], channels: usize) {
    let frames = data.len() / channels;
    let mut block = PlanarBlock::new(data, channels, frames).unwrap();
    route_block(registry, config, &mut block);
}

fn channel(data: &[f32], frames: usize, ch: usize) -> &[f32] {
    &data[ch * frames..(ch + 1) * frames]
}

// ============================================================================
// Routing scenarios
// ============================================================================

#[test]
fn base_choice_only_passes_first_group() {
    let frames = 32;
    let mut reg = ChoiceRegistry::new();
    reg.reset_all_ramps(SAMPLE_RATE, 0.05);
    reg.set_choice_target(0, true);
    reg.snap_to_targets();

    let mut data = channel_ramp(6, frames);
    route(&mut reg, RouteConfig::new(2, 3), &mut data, 6);

    assert!(channel(&data, frames, 0).iter().all(|&s| s == 1.0));
    assert!(channel(&data, frames, 1).iter().all(|&s| s == 2.0));
    for ch in 2..6 {
        assert!(channel(&data, frames, ch).iter().all(|&s| s == 0.0));
    }
}

#[test]
fn wide_stride_reads_only_existing_channels() {
    let frames = 16;
    let mut reg = ChoiceRegistry::new();
    reg.set_choice_target(1, true);

    // Choice 1 covers channels 32..64 but only 32..40 exist.
    let mut data = channel_ramp(40, frames);
    route(&mut reg, RouteConfig::new(32, 2), &mut data, 40);

    for ch in 0..8 {
        let expected = (32 + ch) as f32 + 1.0;
        assert!(channel(&data, frames, ch).iter().all(|&s| s == expected));
    }
    for ch in 8..40 {
        assert!(channel(&data, frames, ch).iter().all(|&s| s == 0.0), "ch {ch}");
    }
}

#[test]
fn toggle_mode_sums_active_choices() {
    let frames = 8;
    let mut reg = ChoiceRegistry::new();
    let policy = SelectionPolicy::new(SelectionMode::ToggleMode);
    policy.submit(ActivationRequest::activate(0, ActivationOrigin::UserInterface), &mut reg);
    policy.submit(ActivationRequest::activate(2, ActivationOrigin::UserInterface), &mut reg);

    let mut data = channel_ramp(6, frames);
    route(&mut reg, RouteConfig::new(2, 3), &mut data, 6);

    // ch0 = in0 + in4, ch1 = in1 + in5
    assert!(channel(&data, frames, 0).iter().all(|&s| s == 1.0 + 5.0));
    assert!(channel(&data, frames, 1).iter().all(|&s| s == 2.0 + 6.0));
}

#[test]
fn choices_beyond_active_count_are_ignored() {
    let frames = 8;
    let mut reg = ChoiceRegistry::new();
    reg.set_choice_target(3, true);

    let mut data = channel_ramp(8, frames);
    route(&mut reg, RouteConfig::new(2, 3), &mut data, 8);

    assert!(data.iter().all(|&s| s == 0.0));
}

#[test]
fn exclusive_switch_crossfades_then_settles() {
    let frames = 64;
    let mut reg = ChoiceRegistry::new();
    // 480 samples at 48 kHz.
    reg.reset_all_ramps(SAMPLE_RATE, 0.010);
    let policy = SelectionPolicy::new(SelectionMode::ExclusiveSolo);

    policy.submit(ActivationRequest::activate(0, ActivationOrigin::UserInterface), &mut reg);
    reg.snap_to_targets();
    policy.submit(ActivationRequest::activate(1, ActivationOrigin::UserInterface), &mut reg);

    // First block: both groups audible.
    let mut data = channel_ramp(4, frames);
    route(&mut reg, RouteConfig::new(2, 2), &mut data, 4);
    let first = channel(&data, frames, 0)[0];
    assert!(first > 1.0 && first < 3.0, "mixed sample {first}");
    assert!(reg.gain_ramp(0).unwrap().is_smoothing());
    assert!(reg.gain_ramp(1).unwrap().is_smoothing());

    // 64 samples per block, 480 samples per fade: settled after 8 blocks.
    for _ in 0..8 {
        let mut data = channel_ramp(4, frames);
        route(&mut reg, RouteConfig::new(2, 2), &mut data, 4);
    }
    assert!(!reg.any_smoothing());

    let mut data = channel_ramp(4, frames);
    route(&mut reg, RouteConfig::new(2, 2), &mut data, 4);
    assert!(channel(&data, frames, 0).iter().all(|&s| s == 3.0));
    assert!(channel(&data, frames, 1).iter().all(|&s| s == 4.0));
}

#[test]
fn zero_fade_is_a_hard_cut() {
    let frames = 16;
    let mut reg = ChoiceRegistry::new();
    reg.reset_all_ramps(SAMPLE_RATE, 0.0);
    let policy = SelectionPolicy::new(SelectionMode::ExclusiveSolo);

    policy.submit(ActivationRequest::activate(0, ActivationOrigin::Remote), &mut reg);
    policy.submit(ActivationRequest::activate(1, ActivationOrigin::Remote), &mut reg);
    assert!(!reg.any_smoothing());

    let mut data = channel_ramp(4, frames);
    route(&mut reg, RouteConfig::new(2, 2), &mut data, 4);
    assert!(channel(&data, frames, 0).iter().all(|&s| s == 3.0));
}

// ============================================================================
// Selection invariants
// ============================================================================

#[test]
fn exclusive_leaves_single_choice_at_steady_state() {
    let mut reg = ChoiceRegistry::new();
    reg.reset_all_ramps(SAMPLE_RATE, 0.05);
    let policy = SelectionPolicy::new(SelectionMode::ExclusiveSolo);

    for k in [3, 0, 17, 31, 3] {
        policy.submit(ActivationRequest::activate(k, ActivationOrigin::UserInterface), &mut reg);
        reg.snap_to_targets();
        let on: Vec<usize> = (0..MAX_CHOICES).filter(|&c| reg.is_choice_on(c)).collect();
        assert_eq!(on, vec![k]);
    }
}

#[test]
fn remote_double_toggle_is_net_noop() {
    let mut reg = ChoiceRegistry::new();
    let policy = SelectionPolicy::new(SelectionMode::ToggleMode);
    reg.set_choice_target(0, true);

    for _ in 0..2 {
        let current = reg.is_choice_on(4);
        policy.submit(ActivationRequest::toggle(4, current, ActivationOrigin::Remote), &mut reg);
    }
    assert!(!reg.is_choice_on(4));
    assert!(reg.is_choice_on(0));
}

#[test]
fn mode_switch_keeps_existing_states() {
    let mut reg = ChoiceRegistry::new();
    let mut policy = SelectionPolicy::new(SelectionMode::ToggleMode);
    policy.submit(ActivationRequest::activate(0, ActivationOrigin::UserInterface), &mut reg);
    policy.submit(ActivationRequest::activate(1, ActivationOrigin::UserInterface), &mut reg);

    policy.set_mode(SelectionMode::ExclusiveSolo);
    assert!(reg.is_choice_on(0) && reg.is_choice_on(1));

    // Re-activating or releasing an active choice only re-asserts it.
    policy.submit(ActivationRequest::activate(1, ActivationOrigin::Automation), &mut reg);
    policy.submit(ActivationRequest::deactivate(1, ActivationOrigin::Automation), &mut reg);
    assert!(reg.is_choice_on(0) && reg.is_choice_on(1));

    // Switching on an inactive choice solos it.
    policy.submit(ActivationRequest::activate(3, ActivationOrigin::UserInterface), &mut reg);
    let on: Vec<usize> = (0..MAX_CHOICES).filter(|&c| reg.is_choice_on(c)).collect();
    assert_eq!(on, vec![3]);
}

// ============================================================================
// Parameter decoding feeds routing
// ============================================================================

#[test]
fn default_parameters_give_five_stereo_choices() {
    let count = params::descriptor(params::NUMBER_OF_CHOICES).unwrap().default;
    let size = params::descriptor(params::CHANNEL_SIZE).unwrap().default;
    let config = RouteConfig::new(params::stride(size), params::active_choices(count));
    assert_eq!(config, RouteConfig::default());
    assert_eq!(config.stride, 2);
    assert_eq!(config.active_choices, 5);
}
