//! The era simulations, one module per motion pattern.
//!
//! | Key | Type | Pattern |
//! |-----|------|---------|
//! | `planck` | [`Planck`] | axis-orbiting polyhedra with a displacement pulse |
//! | `great_unification` | [`GreatUnification`] | pulsing Fibonacci shells with flashes |
//! | `inflation` | [`Inflation`] | creeping shells pushed by fast bodies |
//! | `electroweak` | [`Electroweak`] | counter-rotating pairs with annihilation bursts |
//! | `quark` | [`Quark`] | reflecting quark-gluon soup with links |
//! | `hadron` | [`Hadron`] | drifting three-member composites |
//! | `lepton` | [`Lepton`] | respawning movers deflected by trios |
//! | `nucleosynthesis` | [`Nucleosynthesis`] | free trios and tetras |
//! | `photon` | [`Photon`] | trio shells hit by a photon stream |
//! | `recombination` | [`Recombination`] | nuclei with orbiting electrons |
//! | `dark` | [`Dark`] | sampled neighbor-force cloud |
//! | `reionization` | [`Reionization`] | nebula, cubes, bubbles and flashing stars |
//! | `galaxy` | [`GalaxyDisk`] | planar orbits |
//! | `stellar` | [`Stellar`] | nebula, planets and an asteroid belt |
//! | `white_dwarf` | [`WhiteDwarf`] | asteroid ring with bipolar jets |
//! | `black_hole` | [`BlackHole`] | accretion disk with bipolar jets |
//! | `heat_death` | [`HeatDeath`] | fading embers |

mod black_hole;
mod dark;
mod electroweak;
mod flashes;
mod galaxy;
mod great_unification;
mod hadron;
mod heat_death;
mod inflation;
mod jets;
mod lepton;
mod nuclei;
mod nucleosynthesis;
mod photon;
mod planck;
mod quark;
mod recombination;
mod reionization;
mod stellar;
mod trails;
mod white_dwarf;

pub use black_hole::{BlackHole, BlackHoleOptions};
pub use dark::{neighbor_force_step, Dark, DarkOptions, DarkParticle, NeighborForce};
pub use electroweak::{Electroweak, ElectroweakOptions, Pair};
pub use flashes::FlashPool;
pub use galaxy::{GalaxyDisk, GalaxyOptions};
pub use great_unification::{GreatUnification, GreatUnificationOptions};
pub use hadron::{Hadron, HadronOptions};
pub use heat_death::{HeatDeath, HeatDeathOptions};
pub use inflation::{Inflation, InflationOptions};
pub use jets::{BipolarJets, JetOptions, JetParticle};
pub use lepton::{lateral_deflection, Lepton, LeptonOptions};
pub use nuclei::{FreeTrio, Helium, Nuclei, NucleiOptions};
pub use nucleosynthesis::{Nucleosynthesis, NucleosynthesisOptions};
pub use photon::{Photon, PhotonOptions};
pub use planck::{Planck, PlanckOptions};
pub use quark::{Quark, QuarkOptions};
pub use recombination::{Recombination, RecombinationOptions};
pub use reionization::{Reionization, ReionizationOptions};
pub use stellar::{PlanetSpec, Stellar, StellarOptions};
pub use trails::{PhotonStream, StreamOptions, TrailPool};
pub use white_dwarf::{WhiteDwarf, WhiteDwarfOptions};
