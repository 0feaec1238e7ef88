// ============================================================================
// Data-fetch : FetchState et Resource
// ============================================================================
// Lie une vue à UNE source de données asynchrone :
// - FetchState<T> : la machine à états pure {data, loading, error}
// - Resource<T>   : FetchState + fetcher async + tâches tokio
//
// Contrat :
// - mount()   : exactement un fetch à la première apparition de la vue
// - refetch() : exactement un fetch de plus à chaque appel
// - pendant un refetch, l'ancienne `data` reste affichée
// - une réponse qui n'est pas celle de la DERNIÈRE requête émise est ignorée
//   (le dernier demandé gagne, pas le dernier arrivé)
// - une Resource détruite annule ses tâches ; rien n'arrive après le drop
//
// CONCEPT RUST : Channels tokio
// - Les tâches de fetch tournent sur le runtime tokio
// - Le résultat revient par un mpsc vers le thread UI
// - Le thread UI l'applique dans sync(), sans jamais bloquer
// ============================================================================

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::RequestError;

/// Identifiant croissant d'une requête émise par une Resource
pub type RequestId = u64;

/// Phase visible d'un FetchState
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Aucun fetch encore émis
    Idle,
    /// Une requête est en cours
    Loading,
    /// Dernière requête réussie
    Success,
    /// Dernière requête échouée
    Failure,
}

// ============================================================================
// FetchState : machine à états pure
// ============================================================================

/// État {data, loading, error} d'une vue
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    data: Option<T>,
    loading: bool,
    error: Option<String>,
    /// Dernière requête émise (0 = aucune)
    latest: RequestId,
}

impl<T> FetchState<T> {
    pub fn new() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            latest: 0,
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Dernière requête émise
    pub fn latest_request(&self) -> RequestId {
        self.latest
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Failure
        } else if self.data.is_some() {
            Phase::Success
        } else {
            Phase::Idle
        }
    }

    /// Démarre une requête : loading, erreur effacée, data conservée
    pub fn begin(&mut self) -> RequestId {
        self.latest += 1;
        self.loading = true;
        self.error = None;
        self.latest
    }

    /// Applique le résultat de la requête `id`
    ///
    /// Retourne false (et ne change rien) si `id` n'est pas la dernière
    /// requête émise.
    pub fn resolve<E: fmt::Display>(&mut self, id: RequestId, result: Result<T, E>) -> bool {
        if id != self.latest {
            return false;
        }

        match result {
            Ok(value) => {
                self.data = Some(value);
                self.error = None;
            }
            Err(e) => {
                // data inchangée : l'ancienne valeur reste disponible
                self.error = Some(e.to_string());
            }
        }
        self.loading = false;
        true
    }
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Resource : FetchState + fetcher asynchrone
// ============================================================================

/// Fonction sans argument qui produit une requête
pub type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, RequestError>> + Send + Sync>;

type Completion<T> = (RequestId, Result<T, RequestError>);

/// Source de données d'une section du dashboard
pub struct Resource<T> {
    name: &'static str,
    state: FetchState<T>,
    fetcher: Fetcher<T>,
    runtime: Handle,
    tx: UnboundedSender<Completion<T>>,
    rx: UnboundedReceiver<Completion<T>>,
    in_flight: Vec<JoinHandle<()>>,
    mounted: bool,
}

impl<T> Resource<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

impl<T: Send + 'static> Resource<T> {
    /// Crée une Resource non montée (aucune requête émise)
    ///
    /// CONCEPT RUST : Generics avec trait bounds
    /// - F : la closure qui lance la requête (capturant un TradingApi cloné)
    /// - Fut : la future renvoyée, 'static et Send pour tokio::spawn
    pub fn new<F, Fut>(name: &'static str, runtime: Handle, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, RequestError>> + Send + 'static,
    {
        let fetcher: Fetcher<T> = Arc::new(move || fetch().boxed());
        let (tx, rx) = unbounded_channel();

        Self {
            name,
            state: FetchState::new(),
            fetcher,
            runtime,
            tx,
            rx,
            in_flight: Vec::new(),
            mounted: false,
        }
    }

    /// Premier affichage de la vue : un seul fetch, jamais répété
    ///
    /// Retourne true si un fetch a été émis.
    pub fn mount(&mut self) -> bool {
        if self.mounted {
            return false;
        }
        self.mounted = true;
        self.trigger();
        true
    }

    /// Émet une nouvelle requête ; celles en cours ne sont pas annulées
    /// mais leur résultat sera ignoré.
    pub fn refetch(&mut self) {
        self.mounted = true;
        self.trigger();
    }

    fn trigger(&mut self) {
        let id = self.state.begin();
        let request = (self.fetcher)();
        let tx = self.tx.clone();

        debug!(resource = self.name, request = id, "Fetch started");

        self.in_flight.retain(|handle| !handle.is_finished());
        let handle = self.runtime.spawn(async move {
            // Un fetch qui panique résout quand même sa requête
            let result = AssertUnwindSafe(request)
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(RequestError::Network("fetch task panicked".to_string())));
            // Le receiver n'existe plus si la Resource a été détruite
            let _ = tx.send((id, result));
        });
        self.in_flight.push(handle);
    }

    /// Applique tous les résultats arrivés, sans bloquer
    ///
    /// Retourne le nombre de résultats appliqués (hors réponses périmées).
    pub fn sync(&mut self) -> usize {
        let mut applied = 0;
        while let Ok((id, result)) = self.rx.try_recv() {
            if self.apply(id, result) {
                applied += 1;
            }
        }
        applied
    }

    /// Attend le prochain résultat et l'applique
    ///
    /// Retourne false si la réponse était périmée. À n'appeler que lorsqu'une
    /// requête est en cours.
    pub async fn next_completion(&mut self) -> bool {
        match self.rx.recv().await {
            Some((id, result)) => self.apply(id, result),
            None => false,
        }
    }

    /// Attend que la dernière requête émise soit résolue
    pub async fn settle(&mut self) {
        while self.state.is_loading() {
            self.next_completion().await;
        }
    }

    fn apply(&mut self, id: RequestId, result: Result<T, RequestError>) -> bool {
        if let Err(e) = &result {
            if id == self.state.latest_request() {
                warn!(resource = self.name, request = id, error = %e, "Fetch failed");
            }
        }

        let applied = self.state.resolve(id, result);
        if applied {
            debug!(resource = self.name, request = id, "Fetch resolved");
        } else {
            debug!(
                resource = self.name,
                request = id,
                latest = self.state.latest_request(),
                "Discarded stale response"
            );
        }
        applied
    }
}

// ============================================================================
// Trait Refresh : agir sur un onglet entier
// ============================================================================
// CONCEPT RUST : Trait objects
// - Les Resource d'un onglet ont des T différents
// - &mut dyn Refresh efface le type pour les traiter dans un même Vec
// ============================================================================

/// Opérations d'une Resource qui ne dépendent pas de T
pub trait Refresh {
    fn name(&self) -> &'static str;
    fn mount(&mut self) -> bool;
    fn refetch(&mut self);
    fn sync(&mut self) -> usize;
    fn is_mounted(&self) -> bool;
    fn is_loading(&self) -> bool;
    fn has_error(&self) -> bool;
}

impl<T: Send + 'static> Refresh for Resource<T> {
    fn name(&self) -> &'static str {
        Resource::name(self)
    }

    fn mount(&mut self) -> bool {
        Resource::mount(self)
    }

    fn refetch(&mut self) {
        Resource::refetch(self)
    }

    fn sync(&mut self) -> usize {
        Resource::sync(self)
    }

    fn is_mounted(&self) -> bool {
        Resource::is_mounted(self)
    }

    fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    fn has_error(&self) -> bool {
        self.state.error().is_some()
    }
}

impl<T> Drop for Resource<T> {
    fn drop(&mut self) {
        for handle in &self.in_flight {
            handle.abort();
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::oneshot;

    type Gate = oneshot::Receiver<Result<u32, RequestError>>;

    /// Fetcher dont chaque appel attend le oneshot suivant de la file
    fn gated_resource(gates: Vec<Gate>) -> Resource<u32> {
        let queue = Arc::new(Mutex::new(VecDeque::from(gates)));
        Resource::new("gated", Handle::current(), move || {
            let gate = queue.lock().unwrap().pop_front();
            async move {
                match gate {
                    Some(gate) => gate
                        .await
                        .unwrap_or_else(|_| Err(RequestError::Network("gate dropped".to_string()))),
                    None => Err(RequestError::Network("no gate".to_string())),
                }
            }
        })
    }

    #[test]
    fn test_state_lifecycle_success() {
        let mut state: FetchState<&str> = FetchState::new();
        assert_eq!(state.phase(), Phase::Idle);

        let id = state.begin();
        assert_eq!((state.data(), state.is_loading(), state.error()), (None, true, None));

        assert!(state.resolve::<RequestError>(id, Ok("V")));
        assert_eq!((state.data(), state.is_loading(), state.error()), (Some(&"V"), false, None));
        assert_eq!(state.phase(), Phase::Success);
    }

    #[test]
    fn test_state_lifecycle_failure() {
        let mut state: FetchState<u32> = FetchState::new();
        let id = state.begin();

        assert!(state.resolve(id, Err("boom")));
        assert_eq!(state.data(), None);
        assert!(!state.is_loading());
        assert_eq!(state.error(), Some("boom"));
        assert_eq!(state.phase(), Phase::Failure);
    }

    #[test]
    fn test_begin_clears_error_and_keeps_data() {
        let mut state: FetchState<u32> = FetchState::new();
        let first = state.begin();
        state.resolve::<&str>(first, Ok(1));

        let second = state.begin();
        state.resolve(second, Err("down"));
        // L'échec conserve la donnée précédente
        assert_eq!(state.data(), Some(&1));
        assert_eq!(state.error(), Some("down"));

        state.begin();
        assert_eq!(state.error(), None);
        assert_eq!(state.data(), Some(&1));
        assert!(state.is_loading());
    }

    #[test]
    fn test_stale_resolution_discarded() {
        let mut state: FetchState<u32> = FetchState::new();
        let first = state.begin();
        let second = state.begin();

        assert!(state.resolve::<&str>(second, Ok(2)));
        assert!(!state.resolve::<&str>(first, Ok(1)));
        assert_eq!(state.data(), Some(&2));

        // Une erreur périmée n'écrase pas non plus l'état
        assert!(!state.resolve(first, Err("late")));
        assert_eq!(state.error(), None);
    }

    #[tokio::test]
    async fn test_mount_fetches_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut resource = Resource::new("once", Handle::current(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, RequestError>(42u32) }
        });

        assert_eq!(resource.state().phase(), Phase::Idle);
        assert!(resource.mount());
        assert!(!resource.mount());

        let state = resource.state();
        assert_eq!((state.data(), state.is_loading(), state.error()), (None, true, None));

        resource.settle().await;
        assert_eq!(resource.state().data(), Some(&42));
        assert!(!resource.state().is_loading());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        resource.refetch();
        resource.settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    /// Lecture seule, sans borne sur T (comme les vues)
    fn describe<T>(resource: &Resource<T>) -> (&'static str, bool, Phase) {
        (resource.name(), resource.is_mounted(), resource.state().phase())
    }

    #[tokio::test]
    async fn test_accessors_need_no_bounds() {
        let mut resource = Resource::new("plain", Handle::current(), || async {
            Ok::<_, RequestError>("ready")
        });
        assert_eq!(describe(&resource), ("plain", false, Phase::Idle));

        resource.mount();
        resource.settle().await;
        assert_eq!(describe(&resource), ("plain", true, Phase::Success));
    }

    #[tokio::test]
    async fn test_failure_message_is_stored() {
        let mut resource: Resource<u32> = Resource::new("failing", Handle::current(), || async {
            Err(RequestError::Status(502))
        });
        resource.mount();
        resource.settle().await;

        assert_eq!(resource.state().data(), None);
        assert_eq!(resource.state().error(), Some("HTTP error! status: 502"));
        assert!(!resource.state().is_loading());
    }

    #[tokio::test]
    async fn test_last_requested_wins() {
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        let mut resource = gated_resource(vec![first_rx, second_rx]);

        resource.mount();
        resource.refetch();

        // La seconde requête répond en premier
        second_tx.send(Ok(2)).unwrap();
        assert!(resource.next_completion().await);
        assert_eq!(resource.state().data(), Some(&2));
        assert!(!resource.state().is_loading());

        // La première arrive ensuite : ignorée
        first_tx.send(Ok(1)).unwrap();
        assert!(!resource.next_completion().await);
        assert_eq!(resource.state().data(), Some(&2));
    }

    #[tokio::test]
    async fn test_stale_data_visible_during_refetch() {
        let (first_tx, first_rx) = oneshot::channel();
        let (_second_tx, second_rx) = oneshot::channel();
        let mut resource = gated_resource(vec![first_rx, second_rx]);

        resource.mount();
        first_tx.send(Ok(7)).unwrap();
        resource.settle().await;

        resource.refetch();
        assert_eq!(resource.sync(), 0);
        assert!(resource.state().is_loading());
        assert_eq!(resource.state().data(), Some(&7));
    }

    #[tokio::test]
    async fn test_panicking_fetch_resolves_as_failure() {
        let mut resource: Resource<u32> = Resource::new("panicking", Handle::current(), || async {
            let values: Vec<u32> = Vec::new();
            Ok::<_, RequestError>(values[0])
        });
        resource.mount();

        let settled = tokio::time::timeout(Duration::from_secs(1), resource.settle()).await;
        assert!(settled.is_ok());
        assert!(!resource.state().is_loading());
        assert_eq!(resource.state().error(), Some("Network error: fetch task panicked"));
    }

    #[tokio::test]
    async fn test_drop_cancels_in_flight_request() {
        let (mut tx, rx) = oneshot::channel::<Result<u32, RequestError>>();
        let mut resource = gated_resource(vec![rx]);

        resource.mount();
        tokio::task::yield_now().await;
        drop(resource);

        // La tâche annulée libère son oneshot
        let closed = tokio::time::timeout(Duration::from_secs(1), tx.closed()).await;
        assert!(closed.is_ok());
    }
}
