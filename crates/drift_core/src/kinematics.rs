//! Relativistic particle kinematics.
//!
//! Energies are in keV unless both the kinetic and the rest energy are
//! given in some other common unit.

/// Electron rest energy in keV.
pub const ELECTRON_REST_ENERGY_KEV: f64 = 511.0;

/// Proton rest energy in keV.
pub const PROTON_REST_ENERGY_KEV: f64 = 938_272.0;

/// Lorentz factor `γ = 1 + Ek / Erest`.
pub fn lorentz_factor(kinetic_energy: f64, rest_energy: f64) -> f64 {
    1.0 + kinetic_energy / rest_energy
}

/// Speed as a fraction of light speed, `β = sqrt(1 - γ⁻²)`.
pub fn relativistic_beta(kinetic_energy: f64, rest_energy: f64) -> f64 {
    let gamma = lorentz_factor(kinetic_energy, rest_energy);
    (1.0 - gamma.powi(-2)).sqrt()
}

/// Velocity along the field for a particle that mirrors where the field is
/// `mirror_field`, evaluated where the local field is `local_field`.
///
/// `|B / Bm|` above one (possible from interpolation overshoot near the
/// mirror points) clips to zero parallel speed.
pub fn parallel_velocity(
    kinetic_energy: f64,
    mirror_field: f64,
    local_field: f64,
    rest_energy: f64,
    speed_of_light: f64,
) -> f64 {
    let ratio = (local_field / mirror_field).abs();
    speed_of_light * relativistic_beta(kinetic_energy, rest_energy) * (1.0 - ratio).max(0.0).sqrt()
}
