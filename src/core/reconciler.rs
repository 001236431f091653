use crate::core::diagnostics::{Branch, Diagnostics, Severity};
use crate::domain::dto::CityDto;
use crate::domain::model::{Actor, Address, City, Province};
use crate::domain::ports::{CityStore, Geocoder};
use crate::domain::query::CityQuery;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Local(City),
    External(City),
    NotFound,
}

impl Resolution {
    pub fn city(&self) -> Option<&City> {
        match self {
            Resolution::Local(city) | Resolution::External(city) => Some(city),
            Resolution::NotFound => None,
        }
    }

    pub fn into_city(self) -> Option<City> {
        match self {
            Resolution::Local(city) | Resolution::External(city) => Some(city),
            Resolution::NotFound => None,
        }
    }

    pub fn into_dto(self) -> Option<CityDto> {
        self.into_city().map(CityDto::from)
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Resolution::Local(_))
    }

    pub fn is_external(&self) -> bool {
        matches!(self, Resolution::External(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Resolution::NotFound)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationOutcome {
    pub resolution: Resolution,
    pub branch: Branch,
    pub diagnostics: Diagnostics,
}

/// Picks the authoritative city when the local store and the geocoder disagree.
///
/// The geocoder wins whenever the two sources differ or cannot be compared.
/// The local record wins only on full agreement of name and province.
pub struct Reconciler<S: CityStore, G: Geocoder> {
    store: S,
    geocoder: G,
}

impl<S: CityStore, G: Geocoder> Reconciler<S, G> {
    pub fn new(store: S, geocoder: G) -> Self {
        Self { store, geocoder }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    pub async fn reconcile(
        &self,
        city_name: &str,
        province_id: Option<i64>,
        postal_code: &str,
        actor: Option<&Actor>,
    ) -> ReconciliationOutcome {
        let (candidates, address) = tokio::join!(
            self.local_candidates(city_name, province_id),
            self.external_address(postal_code)
        );

        let diagnostics = Diagnostics::new(
            city_name,
            province_id,
            postal_code,
            &candidates,
            address.as_ref(),
            actor,
        );
        let context = diagnostics.to_string();

        let (branch, resolution) = decide(&candidates, address.as_ref());
        log_branch(branch, &context);

        ReconciliationOutcome {
            resolution,
            branch,
            diagnostics,
        }
    }

    /// Geocodes the postal code and looks the reported city up by province
    /// name and city name, without reconciling the two.
    pub async fn find_by_postal(&self, postal_code: &str) -> Option<City> {
        let address = match self.geocoder.lookup(postal_code).await {
            Ok(address) => address,
            Err(e) => {
                tracing::warn!(
                    "find_by_postal(): geocoder failed for postal_code='{}': {}",
                    postal_code,
                    e
                );
                None
            }
        };

        let province_name = address.as_ref().and_then(Address::province_name);
        let city_name = address.as_ref().and_then(Address::city_name);

        let (Some(province_name), Some(city_name)) = (province_name, city_name) else {
            tracing::warn!(
                "find_by_postal(): Encountered failure for postal_code='{}'. province_name='{}', city_name='{}'",
                postal_code,
                province_name.unwrap_or("null"),
                city_name.unwrap_or("null")
            );
            return None;
        };

        let query = CityQuery::new()
            .province_name(province_name)
            .name_eq(city_name)
            .enabled_only();

        let found = match self.store.find(&query).await {
            Ok(cities) => cities.into_iter().next(),
            Err(e) => {
                tracing::warn!("find_by_postal(): local lookup failed: {}", e);
                None
            }
        };

        if found.is_none() {
            tracing::warn!(
                "find_by_postal(): Encountered failure for postal_code='{}'. province_name='{}', city_name='{}'",
                postal_code,
                province_name,
                city_name
            );
        }
        found
    }

    async fn local_candidates(&self, city_name: &str, province_id: Option<i64>) -> Vec<City> {
        // Equality against a missing province id matches nothing.
        let Some(province_id) = province_id else {
            return Vec::new();
        };

        let query = CityQuery::new()
            .province_id(province_id)
            .name_eq(city_name)
            .enabled_only();

        match self.store.find(&query).await {
            Ok(cities) => cities,
            Err(e) => {
                tracing::warn!("reconcile(): local lookup failed, treating as empty: {}", e);
                Vec::new()
            }
        }
    }

    async fn external_address(&self, postal_code: &str) -> Option<Address> {
        match self.geocoder.lookup(postal_code).await {
            Ok(Some(address)) => {
                if address.city.is_none() {
                    tracing::warn!(
                        "reconcile(): geocoder returned an address without a city for postal_code='{}'; treating the lookup as failed",
                        postal_code
                    );
                }
                Some(address)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(
                    "reconcile(): geocoder failed for postal_code='{}', treating as absent: {}",
                    postal_code,
                    e
                );
                None
            }
        }
    }
}

/// The decision procedure. First matching branch wins.
///
/// An address that carries no city counts as a failed geocoder lookup.
pub fn decide(candidates: &[City], address: Option<&Address>) -> (Branch, Resolution) {
    let local = candidates.first();
    let external = address.and_then(|a| a.city.as_ref().map(|city| (city, a.province.as_ref())));

    match (local, external) {
        (None, None) => (Branch::BothFailed, Resolution::NotFound),
        (None, Some((city, _))) => (Branch::LocalMiss, Resolution::External(city.clone())),
        (Some(local), None) => (Branch::ExternalMiss, Resolution::Local(local.clone())),
        (Some(local), Some((city, province))) => {
            if local.name != city.name {
                return (Branch::NameMismatch, Resolution::External(city.clone()));
            }
            match compare_provinces(local.province(), province) {
                None => (Branch::IncomparableProvince, Resolution::External(city.clone())),
                Some(true) if candidates.len() > 1 => {
                    (Branch::AmbiguousAgreement, Resolution::Local(local.clone()))
                }
                Some(true) => (Branch::Agreement, Resolution::Local(local.clone())),
                Some(false) => (Branch::ProvinceMismatch, Resolution::External(city.clone())),
            }
        }
    }
}

fn compare_provinces(local: Option<&Province>, external: Option<&Province>) -> Option<bool> {
    Some(local?.same_as(external?))
}

fn log_branch(branch: Branch, context: &str) {
    match branch.severity() {
        Severity::Error => {
            tracing::error!(branch = ?branch, "reconcile(): {} {}", branch.message(), context)
        }
        Severity::Warn => {
            tracing::warn!(branch = ?branch, "reconcile(): {} {}", branch.message(), context)
        }
        Severity::Info => {
            tracing::info!(branch = ?branch, "reconcile(): {} {}", branch.message(), context)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diagnostics::ReconcileIssue;
    use crate::domain::model::Region;
    use crate::utils::error::{Result, ServiceError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ONTARIO_ID: i64 = 35;

    struct FixedStore {
        cities: Vec<City>,
        calls: AtomicUsize,
    }

    impl FixedStore {
        fn new(cities: Vec<City>) -> Self {
            Self {
                cities,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CityStore for FixedStore {
        async fn find(&self, query: &CityQuery) -> Result<Vec<City>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .cities
                .iter()
                .filter(|c| query.matches(c))
                .cloned()
                .collect())
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<City>> {
            Ok(self.cities.iter().find(|c| c.id == Some(id)).cloned())
        }

        async fn save(&self, city: City) -> Result<City> {
            Ok(city)
        }

        async fn delete(&self, _id: i64) -> Result<()> {
            Ok(())
        }
    }

    enum FixedGeocoder {
        Found(Address),
        Absent,
        Broken,
    }

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn lookup(&self, _postal_code: &str) -> Result<Option<Address>> {
            match self {
                FixedGeocoder::Found(address) => Ok(Some(address.clone())),
                FixedGeocoder::Absent => Ok(None),
                FixedGeocoder::Broken => Err(ServiceError::geocoder("connection reset")),
            }
        }
    }

    fn ontario() -> Province {
        Province::new(Some(ONTARIO_ID), "Ontario", "ON")
    }

    fn local_city(id: i64, name: &str, province: Option<Province>) -> City {
        City::new(Some(id), name, Some(Region::new(Some(100 + id), "Region", province)))
    }

    fn geocoded(name: &str, province: Option<Province>) -> FixedGeocoder {
        FixedGeocoder::Found(Address::new(Some(City::new(None, name, None)), province))
    }

    async fn run(store: Vec<City>, geocoder: FixedGeocoder, city: &str) -> ReconciliationOutcome {
        Reconciler::new(FixedStore::new(store), geocoder)
            .reconcile(city, Some(ONTARIO_ID), "M5V 2T6", None)
            .await
    }

    #[tokio::test]
    async fn test_both_sources_empty_is_not_found() {
        let outcome = run(vec![], FixedGeocoder::Absent, "Toronto").await;
        assert_eq!(outcome.resolution, Resolution::NotFound);
        assert_eq!(outcome.branch, Branch::BothFailed);
        assert_eq!(outcome.branch.severity(), Severity::Error);
    }

    #[tokio::test]
    async fn test_local_only() {
        let springfield = local_city(1, "Springfield", Some(ontario()));
        let outcome = run(vec![springfield.clone()], FixedGeocoder::Absent, "Springfield").await;
        assert_eq!(outcome.resolution, Resolution::Local(springfield));
        assert_eq!(outcome.branch, Branch::ExternalMiss);
    }

    #[tokio::test]
    async fn test_external_only() {
        let outcome = run(vec![], geocoded("Mississauga", Some(ontario())), "Mississauga").await;
        assert_eq!(
            outcome.resolution,
            Resolution::External(City::new(None, "Mississauga", None))
        );
        assert_eq!(outcome.branch, Branch::LocalMiss);
    }

    #[tokio::test]
    async fn test_full_agreement_prefers_local() {
        let toronto = local_city(1, "Toronto", Some(ontario()));
        let outcome = run(
            vec![toronto.clone()],
            geocoded("Toronto", Some(Province::new(None, "Ontario", "ON"))),
            "Toronto",
        )
        .await;
        assert_eq!(outcome.resolution, Resolution::Local(toronto));
        assert_eq!(outcome.branch, Branch::Agreement);
        assert_eq!(outcome.branch.severity(), Severity::Info);
    }

    #[tokio::test]
    async fn test_province_matched_by_name_alone() {
        let toronto = local_city(1, "Toronto", Some(ontario()));
        let outcome = run(
            vec![toronto.clone()],
            geocoded("Toronto", Some(Province::new(None, "Ontario", "Ont."))),
            "Toronto",
        )
        .await;
        assert_eq!(outcome.resolution, Resolution::Local(toronto));
    }

    #[tokio::test]
    async fn test_name_mismatch_prefers_external() {
        let toronto = local_city(1, "Toronto", Some(ontario()));
        let outcome = run(vec![toronto], geocoded("North York", Some(ontario())), "Toronto").await;
        assert_eq!(
            outcome.resolution,
            Resolution::External(City::new(None, "North York", None))
        );
        assert_eq!(outcome.branch, Branch::NameMismatch);
    }

    #[tokio::test]
    async fn test_province_mismatch_prefers_external() {
        let toronto = local_city(1, "Toronto", Some(ontario()));
        let outcome = run(
            vec![toronto],
            geocoded("Toronto", Some(Province::new(None, "Quebec", "QC"))),
            "Toronto",
        )
        .await;
        assert!(outcome.resolution.is_external());
        assert_eq!(outcome.branch, Branch::ProvinceMismatch);
    }

    #[tokio::test]
    async fn test_ambiguous_local_returns_first_with_advisory() {
        let first = local_city(1, "Richmond", Some(ontario()));
        let second = local_city(2, "Richmond", Some(ontario()));
        let outcome = run(
            vec![first.clone(), second],
            geocoded("Richmond", Some(ontario())),
            "Richmond",
        )
        .await;
        assert_eq!(outcome.resolution, Resolution::Local(first));
        assert_eq!(outcome.branch, Branch::AmbiguousAgreement);
        assert_eq!(outcome.branch.issue(), Some(ReconcileIssue::AmbiguousLocalMatch));
        assert_eq!(outcome.diagnostics.candidate_count, 2);
    }

    #[test]
    fn test_incomplete_local_chain_prefers_external() {
        // Province id filtering would hide these from a real store; exercise the procedure directly.
        let no_province = local_city(1, "Toronto", None);
        let no_region = City::new(Some(2), "Toronto", None);
        let address = Address::new(Some(City::new(None, "Toronto", None)), Some(ontario()));

        for local in [no_province, no_region] {
            let (branch, resolution) = decide(&[local], Some(&address));
            assert_eq!(branch, Branch::IncomparableProvince);
            assert!(resolution.is_external());
        }
    }

    #[tokio::test]
    async fn test_external_without_province_prefers_external() {
        let toronto = local_city(1, "Toronto", Some(ontario()));
        let outcome = run(vec![toronto], geocoded("Toronto", None), "Toronto").await;
        assert_eq!(outcome.branch, Branch::IncomparableProvince);
        assert!(outcome.resolution.is_external());
    }

    #[tokio::test]
    async fn test_repeated_calls_are_idempotent() {
        let reconciler = Reconciler::new(
            FixedStore::new(vec![local_city(1, "Toronto", Some(ontario()))]),
            geocoded("Toronto", Some(ontario())),
        );
        let first = reconciler.reconcile("Toronto", Some(ONTARIO_ID), "M5V", None).await;
        let second = reconciler.reconcile("Toronto", Some(ONTARIO_ID), "M5V", None).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_disabled_cities_are_not_candidates() {
        let disabled = local_city(1, "Toronto", Some(ontario())).disabled();
        let outcome = run(vec![disabled], FixedGeocoder::Absent, "Toronto").await;
        assert_eq!(outcome.resolution, Resolution::NotFound);
    }

    #[tokio::test]
    async fn test_missing_province_id_skips_store() {
        let reconciler = Reconciler::new(
            FixedStore::new(vec![local_city(1, "Toronto", Some(ontario()))]),
            FixedGeocoder::Absent,
        );
        let outcome = reconciler.reconcile("Toronto", None, "M5V", None).await;
        assert_eq!(outcome.resolution, Resolution::NotFound);
        assert_eq!(reconciler.store().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_geocoder_error_behaves_like_absent() {
        let toronto = local_city(1, "Toronto", Some(ontario()));
        let outcome = run(vec![toronto.clone()], FixedGeocoder::Broken, "Toronto").await;
        assert_eq!(outcome.resolution, Resolution::Local(toronto));
        assert_eq!(outcome.branch, Branch::ExternalMiss);
        assert!(outcome.diagnostics.external_address.is_none());
    }

    #[tokio::test]
    async fn test_address_without_city_counts_as_failed_lookup() {
        let cityless = FixedGeocoder::Found(Address::new(None, Some(ontario())));
        let outcome = run(vec![], cityless, "Toronto").await;
        assert_eq!(outcome.resolution, Resolution::NotFound);
        assert_eq!(outcome.branch, Branch::BothFailed);
        assert!(outcome.diagnostics.external_address.is_some());
    }

    #[tokio::test]
    async fn test_diagnostics_carry_actor() {
        let actor = Actor {
            id: 7,
            login: "agent@example.com".to_string(),
            authorities: vec!["ROLE_USER".to_string()],
            integration_id: None,
        };
        let reconciler = Reconciler::new(FixedStore::new(vec![]), FixedGeocoder::Absent);
        let outcome = reconciler
            .reconcile("Toronto", Some(ONTARIO_ID), "M5V", Some(&actor))
            .await;
        assert_eq!(outcome.diagnostics.actor, Some(actor));
        assert_eq!(outcome.diagnostics.postal_code, "M5V");
    }

    #[tokio::test]
    async fn test_find_by_postal() {
        let toronto = local_city(1, "Toronto", Some(ontario()));
        let reconciler = Reconciler::new(
            FixedStore::new(vec![toronto.clone()]),
            geocoded("Toronto", Some(Province::new(None, "Ontario", "ON"))),
        );
        assert_eq!(reconciler.find_by_postal("M5V").await, Some(toronto));

        let reconciler = Reconciler::new(
            FixedStore::new(vec![local_city(1, "Toronto", Some(ontario()))]),
            geocoded("Toronto", Some(Province::new(None, "Quebec", "QC"))),
        );
        assert_eq!(reconciler.find_by_postal("M5V").await, None);
    }

    #[tokio::test]
    async fn test_find_by_postal_failures() {
        let store = || FixedStore::new(vec![local_city(1, "Toronto", Some(ontario()))]);

        let absent = Reconciler::new(store(), FixedGeocoder::Absent);
        assert_eq!(absent.find_by_postal("M5V").await, None);

        let broken = Reconciler::new(store(), FixedGeocoder::Broken);
        assert_eq!(broken.find_by_postal("M5V").await, None);

        let no_province = Reconciler::new(store(), geocoded("Toronto", None));
        assert_eq!(no_province.find_by_postal("M5V").await, None);
        assert_eq!(no_province.store().calls.load(Ordering::SeqCst), 0);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.0.lock().unwrap().clone())
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    async fn run_logged(
        store: Vec<City>,
        geocoder: FixedGeocoder,
        city: &str,
    ) -> (ReconciliationOutcome, Vec<String>) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::INFO)
            .finish();

        let guard = tracing::subscriber::set_default(subscriber);
        let outcome = run(store, geocoder, city).await;
        drop(guard);

        (outcome, logs.lines())
    }

    fn branch_lines(lines: &[String], branch: Branch) -> Vec<String> {
        let marker = format!("branch={:?}", branch);
        lines
            .iter()
            .filter(|line| line.contains(&marker))
            .cloned()
            .collect()
    }

    #[tokio::test]
    async fn test_every_branch_logs_once_at_its_severity() {
        let toronto = || local_city(1, "Toronto", Some(ontario()));
        let cases = vec![
            (vec![], FixedGeocoder::Absent, Branch::BothFailed, "ERROR"),
            (vec![], geocoded("Toronto", Some(ontario())), Branch::LocalMiss, "WARN"),
            (vec![toronto()], FixedGeocoder::Absent, Branch::ExternalMiss, "WARN"),
            (vec![toronto()], geocoded("North York", Some(ontario())), Branch::NameMismatch, "WARN"),
            (vec![toronto()], geocoded("Toronto", None), Branch::IncomparableProvince, "WARN"),
            (vec![toronto()], geocoded("Toronto", Some(ontario())), Branch::Agreement, "INFO"),
            (
                vec![toronto()],
                geocoded("Toronto", Some(Province::new(None, "Quebec", "QC"))),
                Branch::ProvinceMismatch,
                "WARN",
            ),
        ];

        for (store, geocoder, expected, level) in cases {
            let (outcome, lines) = run_logged(store, geocoder, "Toronto").await;
            assert_eq!(outcome.branch, expected);

            let logged = branch_lines(&lines, expected);
            assert_eq!(logged.len(), 1, "{:?} logged {:?}", expected, lines);
            assert!(
                logged[0].trim_start().starts_with(level),
                "{:?} logged at the wrong level: {}",
                expected,
                logged[0]
            );
            assert!(logged[0].contains(expected.message()));
            assert!(logged[0].contains(r#""postal_code":"M5V 2T6""#));
        }
    }

    #[tokio::test]
    async fn test_ambiguous_match_logs_advisory_warning() {
        let (outcome, lines) = run_logged(
            vec![
                local_city(1, "Richmond", Some(ontario())),
                local_city(2, "Richmond", Some(ontario())),
            ],
            geocoded("Richmond", Some(ontario())),
            "Richmond",
        )
        .await;

        assert_eq!(outcome.branch, Branch::AmbiguousAgreement);
        let logged = branch_lines(&lines, Branch::AmbiguousAgreement);
        assert_eq!(logged.len(), 1);
        assert!(logged[0].trim_start().starts_with("WARN"));
        assert!(logged[0].contains(r#""candidate_count":2"#));
    }
}
