//! Macros for turning a machine set's generated surface into methods.

/// Generate state predicates and event methods on a host type.
///
/// The host must implement [`Persistence`](crate::runtime::Persistence).
/// Each `state` line generates a predicate; each `event` line generates the
/// quiet, strict and `may_` variants, with the names given explicitly so
/// they match [`MachineSet::surface`](crate::core::MachineSet::surface).
///
/// # Example
///
/// ```ignore
/// recordfsm::state_accessors! {
///     impl Parcel for "state" {
///         state is_empty => "empty";
///         state is_filled => "filled";
///         event pack, pack_strict, may_pack => "pack";
///     }
/// }
/// ```
#[macro_export]
macro_rules! state_accessors {
    (
        $(
            impl $host:ident for $attribute:literal {
                $( state $predicate:ident => $state:literal; )*
                $( event $quiet:ident, $strict:ident, $may:ident => $event:literal; )*
            }
        )+
    ) => {
        $(
            impl $host {
                $(
                    pub fn $predicate(&self) -> bool {
                        $crate::runtime::RecordExt::in_state(self, $attribute, $state)
                    }
                )*

                $(
                    pub fn $quiet(&mut self) -> ::std::result::Result<bool, $crate::runtime::Error> {
                        $crate::runtime::fire(self, $attribute, $event)
                    }

                    pub fn $strict(&mut self) -> ::std::result::Result<(), $crate::runtime::Error> {
                        $crate::runtime::fire_strict(self, $attribute, $event)
                    }

                    pub fn $may(&self) -> bool {
                        $crate::runtime::RecordExt::may_fire(self, $attribute, $event)
                    }
                )*
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use crate::runtime::test_support::Crate;
    use crate::runtime::{RecordExt, StatefulRecord};

    state_accessors! {
        impl Crate for "state" {
            state is_empty => "empty";
            state is_filled => "filled";
            event pack, pack_strict, may_pack => "pack";
            event ship, ship_strict, may_ship => "ship";
        }
    }

    #[test]
    fn generated_methods_delegate_to_the_engine() {
        let mut record = Crate::new();
        assert!(record.is_empty());
        assert!(record.may_pack());
        assert!(!record.may_ship());

        assert!(record.pack().unwrap());
        assert!(record.is_filled());
        assert_eq!(record.is("is_filled"), Some(true));

        record.ship_strict().unwrap();
        assert!(!record.is_filled());
        assert_eq!(record.read_state("state").as_deref(), Some("shipped"));
    }

    #[test]
    fn generated_strict_event_reports_missing_transition() {
        let mut record = Crate::new();
        let err = record.ship_strict().unwrap_err();
        assert_eq!(
            err.to_string(),
            "ship does not transition from empty; defined are [filled -> shipped]"
        );
        record.pack_strict().unwrap();
        assert!(record.is_filled());
    }
}
