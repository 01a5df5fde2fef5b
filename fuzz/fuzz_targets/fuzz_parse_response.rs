#![no_main]
use apsema::api::{EcuMinutelyEnergyData, SystemSummaryData, check_envelope};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(body) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let Ok(body) = check_envelope(body) else {
        return;
    };
    let payload = body.get("data").cloned().unwrap_or_default();

    let _ = serde_json::from_value::<SystemSummaryData>(payload.clone());
    if let Ok(minutely) = serde_json::from_value::<EcuMinutelyEnergyData>(payload) {
        // Accepted series always line up
        assert_eq!(minutely.time().len(), minutely.power().len());
        assert_eq!(minutely.time().len(), minutely.energy().len());
        let _ = minutely.latest_power();
    }
});
