// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! Closed enums over string tags.
//!
//! Every catalog in the system is a closed set modeled as a tagged
//! variant with a single `normalize(&str)` entry point. Aliases are
//! expanded here, never at call sites, so adding an alias never means
//! hunting down every place a mode string gets compared.

use crate::error::ProtoError;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $variant:ident => [$($alias:literal),+ $(,)?] ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $variant ),+
        }

        impl $name {
            /// Canonical name (first alias listed).
            pub fn canonical(&self) -> &'static str {
                match self {
                    $( $name::$variant => closed_enum!(@first $($alias),+) ),+
                }
            }

            /// Resolve a string tag (including aliases) into a variant.
            /// Unknown names are a validation error.
            pub fn normalize(raw: &str) -> Result<Self, ProtoError> {
                let lower = raw.to_ascii_lowercase();
                match lower.as_str() {
                    $( $($alias)|+ => Ok($name::$variant), )+
                    other => Err(ProtoError::Validation(format!(
                        concat!("unknown ", stringify!($name), " '{}'"),
                        other
                    ))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.canonical())
            }
        }
    };
    (@first $first:literal $(, $rest:literal)*) => { $first };
}

closed_enum!(
    /// Neuron activation function tag.
    ActivationFunction {
        Identity => ["identity", "linear"],
        Tanh => ["tanh"],
        Sigmoid => ["sigmoid", "sig"],
        Cos => ["cos", "cosine"],
        Gaussian => ["gaussian", "gauss"],
        Relu => ["relu"],
        Sin => ["sin", "sine"],
        Absolute => ["absolute", "abs"],
    }
);

closed_enum!(
    /// Neuron input-aggregation function tag.
    AggregatorFunction {
        DotProduct => ["dot_product", "dot"],
        Product => ["product", "mult"],
        Min => ["min"],
        Max => ["max"],
        Average => ["average", "avg", "mean"],
    }
);

closed_enum!(
    /// Pre/post value processor applied at sensors, actuators and neurons.
    ProcessorTag {
        None => ["none", "noop"],
        Normalize => ["normalize", "norm"],
        Clip => ["clip", "clamp"],
        Scale => ["scale"],
    }
);

closed_enum!(
    /// Synaptic/neuronal plasticity rule tag.
    PlasticityRule {
        None => ["none"],
        Hebbian => ["hebbian", "hebb"],
        OjasRule => ["ojas_rule", "oja"],
        NeuromodulatedHebbian => ["neuromodulated_hebbian", "neuromodulated"],
        SelfModulation => ["self_modulation", "self_modulating"],
    }
);

closed_enum!(
    /// Exoself candidate-selection policy.
    CandidateSelection {
        BestSoFar => ["best_so_far", "best"],
        Original => ["original"],
        Dynamic => ["dynamic", "dynamic_random"],
        All => ["all"],
        AllRandom => ["all_random"],
        Active => ["active"],
        ActiveRandom => ["active_random"],
        Recent => ["recent"],
        RecentRandom => ["recent_random"],
        Current => ["current"],
        CurrentRandom => ["current_random"],
        Lastgen => ["lastgen"],
        LastgenRandom => ["lastgen_random"],
    }
);

closed_enum!(
    /// Whether a candidate-selection mode performs a single uniform
    /// draw (`*_random`) or deterministically uses the full filtered
    /// pool.
    TuningDurationPolicy {
        Fixed => ["fixed"],
        Dynamic => ["dynamic"],
    }
);

closed_enum!(
    HeredityType {
        Darwinian => ["darwinian"],
        Lamarckian => ["lamarckian"],
    }
);

closed_enum!(
    /// Topological-mutation-count policy.
    TopologicalCountPolicy {
        Const => ["const", "constant"],
        NcountLinear => ["ncount_linear", "nsize_proportional"],
        NcountExponential => ["ncount_exponential"],
        WcountLinear => ["wcount_linear", "wsize_proportional"],
    }
);

closed_enum!(
    /// Per-generation tuning-attempt budget policy.
    TuneAttemptPolicy {
        Fixed => ["fixed"],
        LinearDecay => ["linear_decay"],
        TopologyScaled => ["topology_scaled"],
        NsizeProportional => ["nsize_proportional"],
        WsizeProportional => ["wsize_proportional"],
    }
);

closed_enum!(
    /// Speciation identifier strategy.
    SpeciationMode {
        Topology => ["topology"],
        TotN => ["tot_n"],
        Fingerprint => ["fingerprint"],
    }
);

closed_enum!(
    /// Fitness postprocessing strategy.
    FitnessPostprocessing {
        None => ["none"],
        SizeProportional => ["size_proportional"],
        NoveltyProportional => ["novelty_proportional"],
    }
);

closed_enum!(
    /// Selection strategy.
    SelectionStrategy {
        Elite => ["elite"],
        Tournament => ["tournament"],
        SpeciesTournament => ["species_tournament"],
        SpeciesSharedTournament => ["species_shared_tournament", "hof_competition"],
        Rank => ["rank", "hof_rank"],
        Top3 => ["top3", "hof_top3"],
        Efficiency => ["efficiency", "hof_efficiency"],
        Random => ["random", "hof_random"],
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_normalize_to_the_same_variant() {
        assert_eq!(
            SelectionStrategy::normalize("hof_competition").unwrap(),
            SelectionStrategy::SpeciesSharedTournament
        );
        assert_eq!(
            SelectionStrategy::normalize("species_shared_tournament").unwrap(),
            SelectionStrategy::SpeciesSharedTournament
        );
        assert_eq!(
            TopologicalCountPolicy::normalize("nsize_proportional").unwrap(),
            TopologicalCountPolicy::NcountLinear
        );
    }

    #[test]
    fn normalize_is_case_insensitive() {
        assert_eq!(
            ActivationFunction::normalize("TANH").unwrap(),
            ActivationFunction::Tanh
        );
    }

    #[test]
    fn unknown_name_is_a_validation_error() {
        let err = ActivationFunction::normalize("not_a_real_function").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }

    #[test]
    fn canonical_round_trips_through_normalize() {
        for variant in [ActivationFunction::Tanh, ActivationFunction::Relu] {
            let name = variant.canonical();
            assert_eq!(ActivationFunction::normalize(name).unwrap(), variant);
        }
    }
}
