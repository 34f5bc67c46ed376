//! Toy balloon flight dynamics, just enough physics to walk the
//! mission controller through a whole flight: steady ascent, burst at a
//! configurable altitude, parachute descent, landing.

use rand::Rng;
use shared::gps_hal::PositionSnapshot;

pub const GROUND_ALTITUDE_M: f64 = 120.0;

pub struct BalloonDynamics {
    pub altitude_m: f64,
    pub ascent_rate_ms: f64,
    pub burst_altitude_m: f64,
    pub released: bool,
    pub landed: bool,
    /// Degrees and decimal minutes, drifting east with the wind.
    lat_degrees: u32,
    lat_minutes: f64,
    lon_degrees: u32,
    lon_minutes: f64,
    utc_seconds: u32,
}

impl BalloonDynamics {
    pub fn new(utc_seconds: u32) -> Self {
        Self {
            altitude_m: GROUND_ALTITUDE_M,
            ascent_rate_ms: 0.0,
            burst_altitude_m: 30_500.0,
            released: false,
            landed: false,
            lat_degrees: 52,
            lat_minutes: 6.1234,
            lon_degrees: 5,
            lon_minutes: 28.4321,
            utc_seconds,
        }
    }

    /// Starts the ascent; before this the balloon sits on the ground.
    pub fn launch(&mut self, ascent_rate_ms: f64) {
        self.ascent_rate_ms = ascent_rate_ms;
    }

    /// Cuts the payload loose; called when the controller fires the
    /// recovery device.
    pub fn release(&mut self) {
        self.released = true;
    }

    pub fn step(&mut self, dt_s: f64) {
        self.utc_seconds = (self.utc_seconds + dt_s as u32) % 86_400;

        if self.landed {
            return;
        }

        if self.altitude_m >= self.burst_altitude_m {
            self.released = true;
        }

        if self.released {
            // Parachute descent, slowing as the air thickens.
            let rate = 5.0 + 25.0 * (self.altitude_m / self.burst_altitude_m);
            self.altitude_m -= rate * dt_s;
            if self.altitude_m <= GROUND_ALTITUDE_M {
                self.altitude_m = GROUND_ALTITUDE_M;
                self.landed = true;
            }
        } else {
            self.altitude_m += self.ascent_rate_ms * dt_s;
        }

        // Wind drift, only meaningful while airborne.
        if self.airborne() {
            self.lon_minutes += 0.01 * dt_s / 30.0;
            self.lat_minutes += 0.002 * dt_s / 30.0;
        }
    }

    pub fn airborne(&self) -> bool {
        !self.landed && (self.released || self.ascent_rate_ms > 0.0)
    }

    /// Renders the current truth as a GPS fix, with sub-digit noise so
    /// consecutive ground fixes are still byte-identical.
    pub fn snapshot<R: Rng>(&self, rng: &mut R, fix_quality: u8) -> PositionSnapshot {
        let mut snapshot = PositionSnapshot::empty();

        snapshot.time = ascii_time(self.utc_seconds);
        snapshot.latitude = ascii_coordinate::<9>(self.lat_degrees, self.lat_minutes);
        snapshot.longitude = ascii_coordinate::<10>(self.lon_degrees, self.lon_minutes);
        snapshot.lat_north = true;
        snapshot.lon_east = true;
        snapshot.fix_quality = fix_quality;
        snapshot.satellites = rng.gen_range(5..12);

        let noisy_altitude = if self.airborne() {
            self.altitude_m + rng.gen_range(-2.0..2.0)
        } else {
            self.altitude_m
        };
        let text = format!("{:.1}", noisy_altitude);
        let len = text.len().min(snapshot.altitude.len());
        snapshot.altitude[..len].copy_from_slice(&text.as_bytes()[..len]);

        snapshot
    }

    pub fn external_temp_c(&self) -> f64 {
        (20.0 - self.altitude_m * 6.5 / 1000.0).max(-56.5)
    }

    pub fn pressure_pa(&self) -> u32 {
        (101_325.0 * (-self.altitude_m / 8_431.0).exp()) as u32
    }
}

fn ascii_time(utc_seconds: u32) -> [u8; 6] {
    let hours = utc_seconds / 3600;
    let minutes = utc_seconds / 60 % 60;
    let seconds = utc_seconds % 60;
    let text = format!("{:02}{:02}{:02}", hours, minutes, seconds);

    let mut field = [0_u8; 6];
    field.copy_from_slice(text.as_bytes());
    field
}

/// `ddmm.mmmm` (or `dddmm.mmmm` for longitude) from degrees and decimal
/// minutes.
fn ascii_coordinate<const WIDTH: usize>(degrees: u32, minutes: f64) -> [u8; WIDTH] {
    let whole_minutes = minutes as u32;
    let fraction = ((minutes - whole_minutes as f64) * 10_000.0).round() as u32;
    // The minutes part `mm.mmmm` is seven characters; degrees fill the
    // rest of the field with leading zeros.
    let degree_digits = WIDTH - 7;
    let text = format!(
        "{:0deg$}{:02}.{:04}",
        degrees,
        whole_minutes,
        fraction.min(9_999),
        deg = degree_digits
    );

    let mut field = [0_u8; WIDTH];
    field.copy_from_slice(text.as_bytes());
    field
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn coordinates_render_fixed_width() {
        assert_eq!(&ascii_coordinate::<9>(52, 6.1234), b"5206.1234");
        assert_eq!(&ascii_coordinate::<10>(5, 28.4321), b"00528.4321");
    }

    #[test]
    fn flight_profile_rises_bursts_and_lands() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut balloon = BalloonDynamics::new(9 * 3600);
        balloon.launch(5.0);

        let mut peak = 0.0_f64;
        for _ in 0..10_000 {
            balloon.step(30.0);
            peak = peak.max(balloon.altitude_m);
            if balloon.landed {
                break;
            }
        }

        assert!(balloon.landed);
        assert!(peak >= balloon.burst_altitude_m);
        assert_eq!(balloon.altitude_m, GROUND_ALTITUDE_M);

        let snapshot = balloon.snapshot(&mut rng, 1);
        assert!(snapshot.has_lock());
    }
}
