use std::fmt::Write as _;

use chrono::Local;

use crate::packet::TrafficClass;
use crate::simulation::{BatchReport, TickReport};

const RULE: &str =
    "---------------------------------------------------------------------------------";

// ==========================================
// 控制台报表 (只拼字符串，打印交给调用方)
// ==========================================
pub fn render_batch(report: &BatchReport) -> String {
    let mut out = String::new();
    let now_str = Local::now().format("%H:%M:%S").to_string();

    let _ = writeln!(out, "\n📊 [{}] Batch comparison: {} packets", now_str, report.total_packets);
    let _ = writeln!(
        out,
        "arrivals: Gold {} / Silver {} / Bronze {}",
        report.arrivals[TrafficClass::Gold],
        report.arrivals[TrafficClass::Silver],
        report.arrivals[TrafficClass::Bronze]
    );
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "{:<10} | {:<12} | {:<10} | {:<10} | {:<10} | {:<10}",
        "Policy", "Gold loss %", "Gold drop", "Silver drop", "Bronze drop", "Served"
    );
    let _ = writeln!(out, "{RULE}");

    for snap in &report.results {
        let _ = writeln!(
            out,
            "{:<10} | {:<12.2} | {:<10} | {:<10} | {:<10} | {:<10}",
            snap.policy.name(),
            snap.loss_percent[TrafficClass::Gold],
            snap.dropped[TrafficClass::Gold],
            snap.dropped[TrafficClass::Silver],
            snap.dropped[TrafficClass::Bronze],
            snap.total_served()
        );
    }
    let _ = writeln!(out, "{RULE}");
    out
}

pub fn render_tick(report: &TickReport) -> String {
    let mut out = String::new();
    let now_str = Local::now().format("%H:%M:%S").to_string();
    let marker = if report.burst { " 🔥 GOLD BURST" } else { "" };

    let _ = writeln!(out, "\n📊 [{}] tick {}{}", now_str, report.tick, marker);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "{:<26} | {:<11} | {:<8} | {:<11} | {:<16}",
        "Policy", "Gold loss %", "Buffer", "Bronze drop", "Served G/S/B"
    );
    let _ = writeln!(out, "{RULE}");

    for entry in &report.entries {
        let snap = &entry.snapshot;
        let served = entry.frame.served;
        let _ = writeln!(
            out,
            "{:<26} | {:<11.2} | {:<8} | {:<11} | {}/{}/{}",
            snap.policy.label(),
            snap.loss_percent[TrafficClass::Gold],
            snap.occupancy,
            snap.dropped[TrafficClass::Bronze],
            served[TrafficClass::Gold],
            served[TrafficClass::Silver],
            served[TrafficClass::Bronze]
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterConfig;
    use crate::simulation::{LiveSession, run_batch};
    use crate::traffic::{BurstSchedule, TrafficGenerator};

    #[test]
    fn batch_table_lists_every_policy() {
        let report = run_batch(&RouterConfig::default(), &mut TrafficGenerator::new(1), 500).unwrap();
        let text = render_batch(&report);
        for name in ["Baseline", "Choke", "Token", "WFQ"] {
            assert!(text.contains(name), "missing {name}");
        }
        assert!(text.contains("500 packets"));
    }

    #[test]
    fn tick_table_marks_bursts() {
        let mut session = LiveSession::new(&RouterConfig::default(), TrafficGenerator::new(1), 30)
            .unwrap()
            .with_bursts(BurstSchedule::default());
        let first = render_tick(&session.tick().unwrap());
        let second = render_tick(&session.tick().unwrap());
        assert!(first.contains("GOLD BURST"));
        assert!(!second.contains("GOLD BURST"));
        assert!(second.contains("WFQ (Prioritization)"));
    }
}
