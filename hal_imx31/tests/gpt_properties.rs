//! GPT Driver Property Tests
//!
//! Validates the extended clock and the deadline controller against the
//! simulated register block: monotonic time across rollovers, rollover
//! accounting, the deadline guard, arming, one-shot disarm and the compare
//! write-verify loop.

use hal::DeadlineTimer;
use hal_imx31::regs::{FakeGpt, GptRegisters, IR_OF1IE, SR_OF1, SR_ROV};
use hal_imx31::{Gpt, GptConfig};
use proptest::prelude::*;

fn gpt_with(regs: FakeGpt) -> Gpt<FakeGpt> {
    Gpt::new(regs, &GptConfig::default()).expect("default config is valid")
}

/// One step of driver activity
#[derive(Debug, Clone)]
enum Op {
    /// Hardware counts forward
    Advance(u64),
    /// Thread context reads the time
    Now,
    /// Thread context arms a deadline `delta` ticks ahead
    Arm(u64),
    /// The interrupt path runs
    Ack,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u64..=(1 << 30)).prop_map(Op::Advance),
        4 => Just(Op::Now),
        1 => (1u64..=(1 << 20)).prop_map(Op::Arm),
        2 => Just(Op::Ack),
    ]
}

/// Runs the interrupt path whenever a latched rollover could be followed
/// by a second wrap before the next operation, keeping the simulation
/// within the one-rollover-per-acknowledgment assumption.
fn service_rollover(gpt: &mut Gpt<FakeGpt>) {
    let regs = gpt.registers();
    if regs.peek_status() & SR_ROV != 0 && regs.peek_counter() > u32::MAX / 2 {
        gpt.ack_deadline_irq();
    }
}

proptest! {
    /// Test: time never decreases across rollovers and acknowledgments
    ///
    /// Counter reads may also move the counter, which exercises wraps that
    /// land between the flag and counter reads.
    #[test]
    fn prop_current_time_is_monotonic(
        start in any::<u32>(),
        ticks_per_read in 0u32..64,
        ops in prop::collection::vec(op_strategy(), 1..200),
    ) {
        let mut regs = FakeGpt::with_counter(start);
        regs.set_ticks_per_read(ticks_per_read);
        let mut gpt = gpt_with(regs);

        let mut last = gpt.current_time();
        for op in ops {
            match op {
                Op::Advance(ticks) => gpt.registers_mut().advance(ticks),
                Op::Now => {
                    let now = gpt.current_time();
                    prop_assert!(now >= last, "time went from {:#x} to {:#x}", last, now);
                    last = now;
                }
                Op::Arm(delta) => {
                    let now = gpt.current_time();
                    prop_assert!(now >= last);
                    last = now;
                    gpt.set_deadline(now + delta);
                }
                Op::Ack => gpt.ack_deadline_irq(),
            }
            service_rollover(&mut gpt);
        }

        let now = gpt.current_time();
        prop_assert!(now >= last);
    }

    /// Test: a deadline whose low word is not ahead of the counter changes
    /// nothing
    #[test]
    fn prop_deadline_guard_is_noop(
        counter in any::<u32>(),
        high in any::<u32>(),
        behind in any::<u32>(),
        prior_compare in any::<u32>(),
        prior_armed in any::<bool>(),
    ) {
        let mut gpt = gpt_with(FakeGpt::with_counter(counter));

        let regs = gpt.registers_mut();
        regs.write_compare1(prior_compare);
        regs.write_interrupt_enable(if prior_armed { IR_OF1IE } else { 0 });
        let writes_before = regs.compare_writes().len();

        let low = (u64::from(behind) % (u64::from(counter) + 1)) as u32;
        gpt.set_deadline((u64::from(high) << 32) | u64::from(low));

        prop_assert_eq!(gpt.registers().peek_compare1(), prior_compare);
        prop_assert_eq!(gpt.is_armed(), prior_armed);
        prop_assert_eq!(gpt.registers().compare_writes().len(), writes_before);
    }

    /// Test: a deadline ahead of the counter lands in GPTOCR1 and enables
    /// the compare interrupt
    #[test]
    fn prop_deadline_arms_when_ahead(
        counter in 0u32..u32::MAX,
        high in any::<u32>(),
        ahead in any::<u32>(),
    ) {
        let mut gpt = gpt_with(FakeGpt::with_counter(counter));

        let low = counter + 1 + ahead % (u32::MAX - counter);
        gpt.set_deadline((u64::from(high) << 32) | u64::from(low));

        prop_assert_eq!(gpt.registers().peek_compare1(), low);
        prop_assert!(gpt.is_armed());
    }

    /// Test: the compare write converges however many writes are lost
    #[test]
    fn prop_compare_write_converges(dropped in 0usize..256, target in 1u32..=u32::MAX) {
        let mut regs = FakeGpt::new();
        regs.drop_next_compare_writes(dropped);
        let mut gpt = gpt_with(regs);

        gpt.set_deadline(u64::from(target));

        prop_assert_eq!(gpt.registers().peek_compare1(), target);
        prop_assert_eq!(gpt.registers().compare_writes().len(), dropped + 1);
        prop_assert!(gpt.registers().compare_writes().iter().all(|&w| w == target));
    }
}

/// Test: rollover accounting across 0xFFFF_FFFF -> 0
///
/// This validates that:
/// 1. Before acknowledgment the high word already reads HighBits + 1
/// 2. After acknowledgment HighBits itself is HighBits + 1
/// 3. The rollover flag is clear afterwards
#[test]
fn test_rollover_accounting() {
    let mut gpt = gpt_with(FakeGpt::with_counter(u32::MAX));
    let high_before = gpt.high_bits();
    assert_eq!(gpt.current_time(), 0xFFFF_FFFF);

    gpt.registers_mut().advance(1);
    assert_eq!(gpt.registers().peek_counter(), 0);

    let now = gpt.current_time();
    assert_eq!(now >> 32, high_before + 1);
    assert_eq!(now as u32, 0);
    assert_eq!(gpt.high_bits(), high_before);

    gpt.ack_deadline_irq();
    assert_eq!(gpt.high_bits(), high_before + 1);
    assert_eq!(gpt.registers().peek_status() & SR_ROV, 0);
    assert_eq!(gpt.current_time(), now);
}

/// Test: many periods accumulate one high-bit increment each
#[test]
fn test_rollovers_accumulate() {
    let mut gpt = gpt_with(FakeGpt::new());

    for period in 1..=5u64 {
        gpt.registers_mut().advance(1 << 32);
        assert_eq!(gpt.current_time(), period << 32);
        gpt.ack_deadline_irq();
        assert_eq!(gpt.high_bits(), period);
    }
}

/// Test: the enable bit is clear after acknowledgment whatever fired
#[test]
fn test_one_shot_disarm() {
    // Compare match
    let mut gpt = gpt_with(FakeGpt::with_counter(100));
    gpt.set_deadline(200);
    gpt.registers_mut().advance(100);
    assert_eq!(gpt.registers().peek_status() & SR_OF1, SR_OF1);
    gpt.ack_deadline_irq();
    assert!(!gpt.is_armed());
    assert_eq!(gpt.registers().peek_status(), 0);

    // Rollover while armed for a later compare
    let mut gpt = gpt_with(FakeGpt::with_counter(0xFFFF_FF00));
    gpt.set_deadline(0xFFFF_FFF0);
    gpt.registers_mut().latch_status(SR_ROV);
    gpt.ack_deadline_irq();
    assert!(!gpt.is_armed());
    assert_eq!(gpt.registers().peek_status(), 0);

    // Nothing pending at all
    let mut gpt = gpt_with(FakeGpt::with_counter(5));
    gpt.set_deadline(50);
    gpt.ack_deadline_irq();
    assert!(!gpt.is_armed());
}

/// Test: a full tick cycle through the HAL traits
///
/// Arms a deadline, lets the counter reach it, handles the interrupt and
/// re-arms for the next period, as a scheduler tick would.
#[test]
fn test_periodic_tick_through_traits() {
    const PERIOD: u64 = 0x4000_0000;

    fn tick<T: DeadlineTimer>(timer: &mut T) -> u64 {
        let now = timer.poll_ticks();
        timer.set_deadline(now + PERIOD);
        now
    }

    let mut gpt = gpt_with(FakeGpt::new());
    let mut previous = tick(&mut gpt);

    for _ in 0..12 {
        gpt.registers_mut().advance(PERIOD);
        assert!(gpt.registers().irq_pending() || gpt.registers().peek_status() & SR_ROV != 0);

        DeadlineTimer::ack_deadline_irq(&mut gpt);
        let now = tick(&mut gpt);
        assert_eq!(now - previous, PERIOD);
        previous = now;
    }

    assert_eq!(gpt.high_bits(), 3);
}
