use std::sync::{Mutex, PoisonError};

use tracing::{debug, info, trace, warn};
use x11rb::connection::Connection;
use x11rb::errors::ReplyError;
use x11rb::protocol::xproto::{Atom, AtomEnum, ConnectionExt, Window};
use x11rb::rust_connection::RustConnection;

use xwin_core::{QueryError, RawRect, RawWindowFacts, WindowQueryAdapter};

use crate::procfs::read_process_facts;

const MAX_PROPERTY_LENGTH: u32 = 2048;
const MAX_CLIENT_LIST_LENGTH: u32 = 4096;

struct Atoms {
    net_active_window: Atom,
    net_client_list_stacking: Atom,
    net_wm_pid: Atom,
    net_wm_name: Atom,
    utf8_string: Atom,
    net_wm_window_type: Atom,
    net_wm_window_type_normal: Atom,
}

/// One live connection to the X server, with the atoms interned on it.
struct X11Session {
    connection: RustConnection,
    root_window: Window,
    atoms: Atoms,
}

/// Window queries against an EWMH compliant X11 window manager.
///
/// The connection is replaced on the next query once the server drops it, so a
/// restarted X server is picked up without recreating the adapter.
pub struct X11WindowAdapter {
    session: Reconnecting<X11Session>,
    normal_only: bool,
}

/// Holds the current session and forgets it when a query reports a broken
/// connection.
struct Reconnecting<S> {
    current: Mutex<Option<S>>,
}

impl X11WindowAdapter {
    /// Connects to the display named by `DISPLAY`.
    ///
    /// `normal_only` restricts enumeration to `_NET_WM_WINDOW_TYPE_NORMAL` windows, which
    /// leaves out docks, panels and desktop windows.
    pub fn connect(normal_only: bool) -> Result<Self, QueryError> {
        let session = X11Session::open()?;

        Ok(Self {
            session: Reconnecting::new(session),
            normal_only,
        })
    }
}

impl X11Session {
    fn open() -> Result<Self, QueryError> {
        let (connection, screen_number) = RustConnection::connect(None).map_err(|error| {
            QueryError::unsupported(format!("failed to connect to X11 display: {}", error))
        })?;

        let root_window = connection
            .setup()
            .roots
            .get(screen_number)
            .map(|screen| screen.root)
            .ok_or_else(|| QueryError::unsupported("X11 display has no screen"))?;

        let atoms = Atoms {
            net_active_window: intern(&connection, b"_NET_ACTIVE_WINDOW")?,
            net_client_list_stacking: intern(&connection, b"_NET_CLIENT_LIST_STACKING")?,
            net_wm_pid: intern(&connection, b"_NET_WM_PID")?,
            net_wm_name: intern(&connection, b"_NET_WM_NAME")?,
            utf8_string: intern(&connection, b"UTF8_STRING")?,
            net_wm_window_type: intern(&connection, b"_NET_WM_WINDOW_TYPE")?,
            net_wm_window_type_normal: intern(&connection, b"_NET_WM_WINDOW_TYPE_NORMAL")?,
        };

        debug!(screen_number, "X11 session opened");

        Ok(Self {
            connection,
            root_window,
            atoms,
        })
    }

    fn get_active_window(&self) -> Result<Option<Window>, ReplyError> {
        let reply = self
            .connection
            .get_property(
                false,
                self.root_window,
                self.atoms.net_active_window,
                AtomEnum::WINDOW,
                0,
                1,
            )?
            .reply()?;

        Ok(reply
            .value32()
            .and_then(|mut windows| windows.next())
            .filter(|window| *window != 0))
    }

    fn get_client_list(&self) -> Result<Vec<Window>, ReplyError> {
        let reply = self
            .connection
            .get_property(
                false,
                self.root_window,
                self.atoms.net_client_list_stacking,
                AtomEnum::WINDOW,
                0,
                MAX_CLIENT_LIST_LENGTH,
            )?
            .reply()?;

        Ok(reply
            .value32()
            .map(|windows| windows.filter(|window| *window != 0).collect())
            .unwrap_or_default())
    }

    fn get_window_facts(&self, window: Window) -> RawWindowFacts {
        let process_id = self.get_window_pid(window);
        let process = process_id.map(read_process_facts).unwrap_or_default();

        RawWindowFacts {
            title: self.get_window_title(window),
            process_id,
            exec_name: process.exec_name,
            class_name: self.get_window_class(window),
            path: process.path,
            bounds: self.get_window_bounds(window),
            memory_bytes: process.memory_bytes,
        }
    }

    fn get_window_class(&self, window: Window) -> Option<String> {
        let reply = self
            .connection
            .get_property(
                false,
                window,
                AtomEnum::WM_CLASS,
                AtomEnum::STRING,
                0,
                MAX_PROPERTY_LENGTH,
            )
            .ok()?
            .reply()
            .ok()?;

        String::from_utf8_lossy(&reply.value)
            .split('\0')
            .filter(|part| !part.is_empty())
            .last()
            .map(str::to_string)
    }

    fn get_window_title(&self, window: Window) -> Option<String> {
        if let Some(title) = self.get_net_wm_name(window) {
            return Some(title);
        }

        self.get_wm_name(window)
    }

    fn get_net_wm_name(&self, window: Window) -> Option<String> {
        let reply = self
            .connection
            .get_property(
                false,
                window,
                self.atoms.net_wm_name,
                self.atoms.utf8_string,
                0,
                MAX_PROPERTY_LENGTH,
            )
            .ok()?
            .reply()
            .ok()?;

        if reply.value.is_empty() {
            return None;
        }

        String::from_utf8(reply.value).ok()
    }

    fn get_wm_name(&self, window: Window) -> Option<String> {
        let reply = self
            .connection
            .get_property(
                false,
                window,
                AtomEnum::WM_NAME,
                AtomEnum::ANY,
                0,
                MAX_PROPERTY_LENGTH,
            )
            .ok()?
            .reply()
            .ok()?;

        if reply.value.is_empty() {
            return None;
        }

        Some(
            String::from_utf8_lossy(&reply.value)
                .trim_end_matches('\0')
                .to_string(),
        )
    }

    fn get_window_pid(&self, window: Window) -> Option<u32> {
        let reply = self
            .connection
            .get_property(
                false,
                window,
                self.atoms.net_wm_pid,
                AtomEnum::CARDINAL,
                0,
                1,
            )
            .ok()?
            .reply()
            .ok()?;

        reply
            .value32()
            .and_then(|mut values| values.next())
            .filter(|pid| *pid != 0)
    }

    fn get_window_bounds(&self, window: Window) -> Option<RawRect> {
        let geometry = self
            .connection
            .get_geometry(window)
            .ok()?
            .reply()
            .ok()?;

        let origin = self
            .connection
            .translate_coordinates(window, geometry.root, 0, 0)
            .ok()?
            .reply()
            .ok()?;

        Some(RawRect {
            x: i32::from(origin.dst_x),
            y: i32::from(origin.dst_y),
            width: i32::from(geometry.width),
            height: i32::from(geometry.height),
        })
    }

    /// EWMH treats a managed window without `_NET_WM_WINDOW_TYPE` as normal.
    fn is_normal_window(&self, window: Window) -> bool {
        let Some(reply) = self
            .connection
            .get_property(
                false,
                window,
                self.atoms.net_wm_window_type,
                AtomEnum::ATOM,
                0,
                MAX_PROPERTY_LENGTH,
            )
            .ok()
            .and_then(|cookie| cookie.reply().ok())
        else {
            return false;
        };

        if reply.value.is_empty() {
            return true;
        }

        reply
            .value32()
            .map(|mut types| {
                types.any(|window_type| window_type == self.atoms.net_wm_window_type_normal)
            })
            .unwrap_or(false)
    }
}

impl WindowQueryAdapter for X11WindowAdapter {
    fn query_active_window(&self) -> Result<Option<RawWindowFacts>, QueryError> {
        self.session.run(X11Session::open, |session| {
            let Some(window) = session.get_active_window()? else {
                trace!("no window holds focus");
                return Ok(None);
            };

            let facts = session.get_window_facts(window);
            trace!(window, process_id = ?facts.process_id, title = ?facts.title, "detected active window");
            Ok(Some(facts))
        })
    }

    fn query_all_windows(&self) -> Result<Vec<RawWindowFacts>, QueryError> {
        self.session.run(X11Session::open, |session| {
            let windows = session.get_client_list()?;

            let facts: Vec<RawWindowFacts> = windows
                .into_iter()
                .filter(|window| !self.normal_only || session.is_normal_window(*window))
                .map(|window| session.get_window_facts(window))
                .filter(|facts| facts.process_id.is_some())
                .collect();

            trace!(count = facts.len(), "enumerated open windows");
            Ok(facts)
        })
    }

    fn adapter_name(&self) -> &'static str {
        "x11"
    }
}

impl<S> Reconnecting<S> {
    fn new(session: S) -> Self {
        Self {
            current: Mutex::new(Some(session)),
        }
    }

    /// Runs `query` on the current session, opening a new one first if the last
    /// query lost the connection.
    fn run<T>(
        &self,
        open: impl FnOnce() -> Result<S, QueryError>,
        query: impl FnOnce(&S) -> Result<T, ReplyError>,
    ) -> Result<T, QueryError> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);

        if current.is_none() {
            let session = open().map_err(|error| {
                debug!(%error, "X11 reconnect failed");
                QueryError::transient(format!("X11 display unavailable: {}", error))
            })?;
            info!("reconnected to X11 display");
            *current = Some(session);
        }

        let Some(session) = current.as_ref() else {
            return Err(QueryError::transient("X11 display unavailable"));
        };

        match query(session) {
            Ok(value) => Ok(value),
            Err(ReplyError::ConnectionError(error)) => {
                warn!(%error, "X11 connection lost, reconnecting on next query");
                *current = None;
                Err(QueryError::transient(format!("X11 connection lost: {}", error)))
            }
            Err(error) => Err(QueryError::transient(error.to_string())),
        }
    }

    #[cfg(test)]
    fn is_connected(&self) -> bool {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

fn intern(connection: &RustConnection, name: &[u8]) -> Result<Atom, QueryError> {
    let cookie = connection.intern_atom(false, name).map_err(|error| {
        QueryError::unsupported(format!("failed to intern X11 atom: {}", error))
    })?;

    cookie
        .reply()
        .map(|reply| reply.atom)
        .map_err(|error| {
            warn!(%error, atom = %String::from_utf8_lossy(name), "failed to intern atom");
            QueryError::unsupported(format!("failed to intern X11 atom: {}", error))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use x11rb::errors::ConnectionError;

    fn connection_lost<T>() -> Result<T, ReplyError> {
        Err(ReplyError::ConnectionError(ConnectionError::UnknownError))
    }

    fn never_open() -> Result<u32, QueryError> {
        panic!("healthy session must be reused")
    }

    #[test]
    fn healthy_session_is_reused() {
        let session = Reconnecting::new(1_u32);

        assert_eq!(session.run(never_open, |id| Ok(*id)), Ok(1));
        assert_eq!(session.run(never_open, |id| Ok(*id)), Ok(1));
    }

    #[test]
    fn lost_connection_is_replaced_on_next_query() {
        let session = Reconnecting::new(1_u32);
        let opened = Cell::new(0);

        let failed = session.run(never_open, |_| connection_lost::<u32>());
        assert!(matches!(failed, Err(QueryError::Transient { .. })));
        assert!(!session.is_connected());

        let recovered = session.run(
            || {
                opened.set(opened.get() + 1);
                Ok(2)
            },
            |id| Ok(*id),
        );

        assert_eq!(recovered, Ok(2));
        assert_eq!(opened.get(), 1);
        assert!(session.is_connected());
    }

    #[test]
    fn failed_reconnect_is_retried_on_next_query() {
        let session = Reconnecting::new(1_u32);
        session.run(never_open, |_| connection_lost::<u32>()).ok();

        let still_down = session.run(
            || Err(QueryError::unsupported("no display")),
            |id| Ok(*id),
        );
        assert!(matches!(still_down, Err(QueryError::Transient { .. })));
        assert!(!session.is_connected());

        assert_eq!(session.run(|| Ok(3), |id| Ok(*id)), Ok(3));
    }

    #[test]
    fn adapter_can_be_created_or_fails_gracefully() {
        match X11WindowAdapter::connect(true) {
            Ok(adapter) => {
                assert_eq!(adapter.adapter_name(), "x11");
                assert!(adapter.query_all_windows().is_ok());
            }
            Err(error) => assert!(matches!(error, QueryError::Unsupported { .. })),
        }
    }

    #[test]
    fn active_window_query_never_panics() {
        let Ok(adapter) = X11WindowAdapter::connect(true) else {
            println!("X11 not available (expected in CI)");
            return;
        };

        match adapter.query_active_window() {
            Ok(Some(facts)) => println!("active window: {:?}", facts.title),
            Ok(None) => println!("no window holds focus"),
            Err(error) => println!("query failed: {}", error),
        }
    }
}
