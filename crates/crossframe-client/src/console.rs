//! The console API surface: tab management, navigation, custom
//! components, the global event model and push notifications.
//!
//! Every operation builds an argument bag with the exact wire keys the
//! host expects, stamps the API version, and hands it to the session.
//! Operations taking a callback return [`DispatchOutcome::Sent`] with
//! the transaction id that will correlate the answer.

use std::rc::Rc;

use crossframe_core::ArgBag;
use crossframe_protocol::API_VERSION;
use tracing::warn;

use crate::chat::Chat;
use crate::cti::Cti;
use crate::environment::PageEnvironment;
use crate::error::{ClientError, ClientResult};
use crate::events::{self, Region, TabLink};
use crate::loader::ToolkitModule;
use crate::presence::Presence;
use crate::registry::{EventHandler, EventKind, ResponseCallback};
use crate::session::{DispatchOutcome, ReceiveOutcome, Session, SessionCallback};
use crate::transport::Transport;

const ADD_EVENT_LISTENER: &str = "addEventListener";
const ADD_PUSH_NOTIFICATION_LISTENER: &str = "addPushNotificationListener";

/// A version-stamped argument bag, the starting point of every call.
pub(crate) fn versioned_args() -> ArgBag {
    let mut args = ArgBag::new();
    args.set("version", API_VERSION);
    args
}

/// The toolkit's top-level handle, owning the session for one page.
pub struct Console {
    session: Session,
}

impl Console {
    /// Builds a console handle for the given page environment.
    pub fn new(env: PageEnvironment) -> Self {
        Self {
            session: Session::new(env),
        }
    }

    /// The underlying session, for inbound routing and diagnostics.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Telephony operations.
    pub fn cti(&mut self) -> Cti<'_> {
        Cti::new(&mut self.session)
    }

    /// Live chat operations.
    pub fn chat(&mut self) -> Chat<'_> {
        Chat::new(&mut self.session)
    }

    /// Service presence operations.
    pub fn presence(&mut self) -> Presence<'_> {
        Presence::new(&mut self.session)
    }

    /// Routes a raw payload from the message channel; see
    /// [`Session::receive`].
    pub fn receive(&mut self, payload: &str, sender_origin: &str) -> ReceiveOutcome {
        self.session.receive(payload, sender_origin)
    }

    /// The transport selected for this page.
    pub fn transport(&self) -> &Transport {
        self.session.transport()
    }

    /// Whether this page is rendered inside the console shell.
    pub fn is_in_console(&self) -> bool {
        self.session.is_in_console()
    }

    /// Whether this page runs in a canvas context.
    pub fn is_canvas_context(&self) -> bool {
        self.session.is_canvas_context()
    }

    /// Starts loading an optional feature module.
    pub fn include(&self, module: ToolkitModule, on_loaded: Box<dyn FnOnce()>) -> bool {
        self.session.load_module(module, on_loaded)
    }

    fn call(
        &mut self,
        name: &str,
        args: ArgBag,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        self.session
            .execute(name, args, callback.map(SessionCallback::Response))
    }

    fn subscribe_plain(&mut self, name: &str, handler: EventHandler) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("event", true);
        self.session.execute(
            name,
            args,
            Some(SessionCallback::event(EventKind::Plain, handler)),
        )
    }

    /// Opens a primary tab with `url`, or navigates an existing one.
    pub fn open_primary_tab(
        &mut self,
        id: Option<&str>,
        url: &str,
        activate: bool,
        label: Option<&str>,
        name: Option<&str>,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set_opt("id", id);
        args.set("url", url);
        args.set("activate", activate);
        args.set_opt("label", label);
        args.set_opt("name", name);
        self.call("openPrimaryTab", args, callback)
    }

    /// Opens a subtab under the primary tab with `primary_tab_id`.
    pub fn open_subtab(
        &mut self,
        primary_tab_id: &str,
        url: &str,
        activate: bool,
        label: Option<&str>,
        id: Option<&str>,
        name: Option<&str>,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("workspaceId", primary_tab_id);
        args.set("url", url);
        args.set("activate", activate);
        args.set_opt("label", label);
        args.set_opt("id", id);
        args.set_opt("name", name);
        self.call("openSubTab", args, callback)
    }

    /// Opens a subtab under the primary tab named `primary_tab_name`.
    pub fn open_subtab_by_primary_tab_name(
        &mut self,
        primary_tab_name: &str,
        url: &str,
        activate: bool,
        label: Option<&str>,
        id: Option<&str>,
        name: Option<&str>,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("workspaceName", primary_tab_name);
        args.set("url", url);
        args.set("activate", activate);
        args.set_opt("label", label);
        args.set_opt("id", id);
        args.set_opt("name", name);
        self.call("openSubtabByWorkSpaceName", args, callback)
    }

    /// Asks the host for the id of the tab enclosing this frame.
    pub fn get_enclosing_tab_id(&mut self, callback: ResponseCallback) -> DispatchOutcome {
        self.call("getEnclosingTabId", versioned_args(), Some(callback))
    }

    /// Asks for the primary tab id enclosing this subtab.
    pub fn get_enclosing_primary_tab_id(&mut self, callback: ResponseCallback) -> DispatchOutcome {
        self.call("getEnclosingPrimaryTabId", versioned_args(), Some(callback))
    }

    /// Asks for the object id behind the enclosing primary tab.
    pub fn get_enclosing_primary_tab_object_id(
        &mut self,
        callback: ResponseCallback,
    ) -> DispatchOutcome {
        self.call("getEnclosingPrimaryTabObjectId", versioned_args(), Some(callback))
    }

    /// Lists the ids of all open primary tabs.
    pub fn get_primary_tab_ids(&mut self, callback: ResponseCallback) -> DispatchOutcome {
        self.call("getPrimaryTabIds", versioned_args(), Some(callback))
    }

    /// Prevents or re-allows closing of a tab.
    pub fn disable_tab_close(
        &mut self,
        disable: bool,
        tab_id: Option<&str>,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("disable", disable);
        // Absent tab id is transmitted as a boolean false.
        match tab_id {
            Some(tab_id) => args.set("tabId", tab_id),
            None => args.set("tabId", false),
        }
        self.call("disableTabClose", args, callback)
    }

    /// Lists the subtab ids of a primary tab.
    pub fn get_subtab_ids(
        &mut self,
        primary_tab_id: Option<&str>,
        callback: ResponseCallback,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set_opt("primaryTabId", primary_tab_id);
        self.call("getSubtabIds", args, Some(callback))
    }

    /// Fetches page info for the entity shown in a tab.
    pub fn get_page_info(
        &mut self,
        tab_id: Option<&str>,
        callback: ResponseCallback,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set_opt("tabId", tab_id);
        self.call("getPageInfo", args, Some(callback))
    }

    /// Object id of the focused subtab.
    pub fn get_focused_subtab_object_id(&mut self, callback: ResponseCallback) -> DispatchOutcome {
        self.call("getFocusedSubtabObjectId", versioned_args(), Some(callback))
    }

    /// Resets the host session inactivity timer.
    pub fn reset_session_time_out(&mut self) -> DispatchOutcome {
        self.call("resetSessionTimeOut", versioned_args(), None)
    }

    /// Sets the title of a tab, the enclosing one by default.
    pub fn set_tab_title(&mut self, label: &str, tab_id: Option<&str>) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("label", label);
        args.set_opt("tabId", tab_id);
        self.call("setTabTitle", args, None)
    }

    /// Closes the tab with the given id.
    pub fn close_tab(&mut self, id: &str, callback: Option<ResponseCallback>) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("id", id);
        self.call("closeTab", args, callback)
    }

    /// Refreshes a subtab by id with its last known URL.
    pub fn refresh_subtab_by_id(
        &mut self,
        id: &str,
        activate: bool,
        full_refresh: bool,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("id", id);
        args.set("activate", activate);
        args.set("fullRefresh", full_refresh);
        self.call("refreshSubtabById", args, callback)
    }

    /// Refreshes a subtab addressed by name and primary tab name.
    pub fn refresh_subtab_by_name_and_primary_tab_name(
        &mut self,
        name: &str,
        primary_tab_name: &str,
        activate: bool,
        full_refresh: bool,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("name", name);
        args.set("workspaceName", primary_tab_name);
        args.set("activate", activate);
        args.set("fullRefresh", full_refresh);
        self.call("refreshSubtabByNameAndWorkspaceName", args, callback)
    }

    /// Refreshes a subtab addressed by name and primary tab id.
    pub fn refresh_subtab_by_name_and_primary_tab_id(
        &mut self,
        name: &str,
        primary_tab_id: &str,
        activate: bool,
        full_refresh: bool,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("name", name);
        args.set("workspaceId", primary_tab_id);
        args.set("activate", activate);
        args.set("fullRefresh", full_refresh);
        self.call("refreshSubtabByNameAndWorkspaceId", args, callback)
    }

    /// Refreshes a primary tab by id.
    pub fn refresh_primary_tab_by_id(
        &mut self,
        id: &str,
        activate: bool,
        full_refresh: bool,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("id", id);
        args.set("activate", activate);
        args.set("fullRefresh", full_refresh);
        self.call("refreshPrimaryTabById", args, callback)
    }

    /// Refreshes a primary tab by name.
    pub fn refresh_primary_tab_by_name(
        &mut self,
        name: &str,
        activate: bool,
        full_refresh: bool,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("name", name);
        args.set("activate", activate);
        args.set("fullRefresh", full_refresh);
        self.call("refreshPrimaryTabByName", args, callback)
    }

    /// Reopens the most recently closed tab.
    pub fn reopen_last_closed_tab(&mut self, callback: Option<ResponseCallback>) -> DispatchOutcome {
        self.call("reopenLastClosedTab", versioned_args(), callback)
    }

    /// Focuses a subtab by id.
    pub fn focus_subtab_by_id(
        &mut self,
        id: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("id", id);
        self.call("focusSubtabById", args, callback)
    }

    /// Focuses a subtab addressed by name and primary tab name.
    pub fn focus_subtab_by_name_and_primary_tab_name(
        &mut self,
        name: &str,
        primary_tab_name: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("name", name);
        args.set("workspaceName", primary_tab_name);
        self.call("focusSubtabByNameAndWorkspaceName", args, callback)
    }

    /// Focuses a subtab addressed by name and primary tab id.
    pub fn focus_subtab_by_name_and_primary_tab_id(
        &mut self,
        name: &str,
        primary_tab_id: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("name", name);
        args.set("workspaceId", primary_tab_id);
        self.call("focusSubtabByNameAndWorkspaceId", args, callback)
    }

    /// Focuses a primary tab by id.
    pub fn focus_primary_tab_by_id(
        &mut self,
        id: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("id", id);
        self.call("focusPrimaryTabById", args, callback)
    }

    /// Focuses a primary tab by name.
    pub fn focus_primary_tab_by_name(
        &mut self,
        name: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("name", name);
        self.call("focusPrimaryTabByName", args, callback)
    }

    /// Marks the current tab's unsaved-changes indicator.
    pub fn set_tab_unsaved_changes(
        &mut self,
        dirty: bool,
        subtab_id: Option<&str>,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("isDirty", dirty);
        args.set_opt("subtabId", subtab_id);
        self.call("setTabDirty", args, callback)
    }

    /// Fires when the user saves from the unsaved-changes dialog.
    pub fn on_tab_save(&mut self, handler: EventHandler) -> DispatchOutcome {
        self.subscribe_plain("onTabSave", handler)
    }

    /// Fires when focus moves to a different subtab.
    pub fn on_focused_subtab(&mut self, handler: EventHandler) -> DispatchOutcome {
        self.subscribe_plain("onFocusedSubtab", handler)
    }

    /// Fires when focus moves to a different primary tab.
    pub fn on_focused_primary_tab(&mut self, handler: EventHandler) -> DispatchOutcome {
        self.subscribe_plain("onFocusedPrimaryTab", handler)
    }

    /// Fires when the enclosing tab refreshes.
    pub fn on_enclosing_tab_refresh(&mut self, handler: EventHandler) -> DispatchOutcome {
        self.subscribe_plain("onEnclosingTabRefresh", handler)
    }

    /// Id of the currently focused primary tab.
    pub fn get_focused_primary_tab_id(&mut self, callback: ResponseCallback) -> DispatchOutcome {
        self.call("getFocusedPrimaryTabId", versioned_args(), Some(callback))
    }

    /// Object id behind the currently focused primary tab.
    pub fn get_focused_primary_tab_object_id(
        &mut self,
        callback: ResponseCallback,
    ) -> DispatchOutcome {
        self.call("getFocusedPrimaryTabObjectId", versioned_args(), Some(callback))
    }

    /// Id of the currently focused subtab.
    pub fn get_focused_subtab_id(&mut self, callback: ResponseCallback) -> DispatchOutcome {
        self.call("getFocusedSubtabId", versioned_args(), Some(callback))
    }

    /// Whether this page is hosted in a custom console component.
    pub fn is_in_custom_console_component(&mut self, callback: ResponseCallback) -> DispatchOutcome {
        self.call("isInCustomConsoleComponent", versioned_args(), Some(callback))
    }

    /// Sets the hosting component's button text.
    pub fn set_custom_console_component_button_text(
        &mut self,
        text: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("text", text);
        self.call("setCustomConsoleComponentButtonText", args, callback)
    }

    /// Sets the hosting component's button CSS style.
    pub fn set_custom_console_component_button_style(
        &mut self,
        style: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("style", style);
        self.call("setCustomConsoleComponentButtonStyle", args, callback)
    }

    /// Sets the hosting component's button icon.
    pub fn set_custom_console_component_button_icon_url(
        &mut self,
        icon_url: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("iconUrl", icon_url);
        self.call("setCustomConsoleComponentButtonIconUrl", args, callback)
    }

    /// Shows or hides the hosting component's window.
    pub fn set_custom_console_component_visible(
        &mut self,
        visible: bool,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("visible", visible);
        self.call("setCustomConsoleComponentWindowVisible", args, callback)
    }

    /// Whether the hosting component's window is hidden.
    pub fn is_custom_console_component_hidden(
        &mut self,
        callback: ResponseCallback,
    ) -> DispatchOutcome {
        self.call("isCustomConsoleComponentWindowHidden", versioned_args(), Some(callback))
    }

    /// Sets the hosting component's window width in pixels.
    pub fn set_custom_console_component_width(
        &mut self,
        width: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("width", width);
        self.call("setCustomConsoleComponentWidth", args, callback)
    }

    /// Sets the hosting component's window height in pixels.
    pub fn set_custom_console_component_height(
        &mut self,
        height: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("height", height);
        self.call("setCustomConsoleComponentHeight", args, callback)
    }

    /// Fires when the hosting component's button is clicked.
    pub fn on_custom_console_component_button_clicked(
        &mut self,
        handler: EventHandler,
    ) -> DispatchOutcome {
        self.subscribe_plain("onCustomConsoleComponentButtonClicked", handler)
    }

    /// Scrolls the hosting component's button text.
    pub fn scroll_custom_console_component_button_text(
        &mut self,
        interval: &str,
        pixels_to_scroll: &str,
        left_scrolling: bool,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("interval", interval);
        args.set("pixelsToScroll", pixels_to_scroll);
        args.set("isLeftScrolling", left_scrolling);
        self.call("scrollCustomConsoleComponentButtonText", args, callback)
    }

    /// Stops scrolling the hosting component's button text.
    pub fn remove_scroll_custom_console_component_button_text(
        &mut self,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        self.call(
            "removeScrollCustomConsoleComponentButtonText",
            versioned_args(),
            callback,
        )
    }

    /// Blinks the hosting component's button text.
    pub fn blink_custom_console_component_button_text(
        &mut self,
        alternate_text: &str,
        interval: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("alternateText", alternate_text);
        args.set("interval", interval);
        self.call("blinkCustomConsoleComponentButtonText", args, callback)
    }

    /// Stops blinking the hosting component's button text.
    pub fn remove_blink_custom_console_component_button_text(
        &mut self,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        self.call(
            "removeBlinkCustomConsoleComponentButtonText",
            versioned_args(),
            callback,
        )
    }

    /// Allows or forbids popping the hosting component out.
    pub fn set_custom_console_component_popoutable(
        &mut self,
        popoutable: bool,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("popoutable", popoutable);
        self.call("setCustomConsoleComponentPopoutable", args, callback)
    }

    /// Whether the hosting component is popped out.
    pub fn is_custom_console_component_popped_out(
        &mut self,
        callback: ResponseCallback,
    ) -> DispatchOutcome {
        self.call("isCustomConsoleComponentPoppedOut", versioned_args(), Some(callback))
    }

    /// Subscribes `handler` to a global event type.
    ///
    /// Console tab events are qualified with `tab_id` when given. The
    /// first subscription for a type goes to the host; later ones are
    /// served locally and report
    /// [`DispatchOutcome::AlreadySubscribed`].
    pub fn add_event_listener(
        &mut self,
        event_type: &str,
        handler: EventHandler,
        tab_id: Option<&str>,
    ) -> ClientResult<DispatchOutcome> {
        if event_type.is_empty() {
            return Err(ClientError::InvalidArgument("empty event type".to_string()));
        }
        let event_type = self.qualify(event_type, tab_id);
        let mut args = versioned_args();
        args.set("event", true);
        args.set("eventType", event_type.as_str());
        Ok(self.session.execute(
            ADD_EVENT_LISTENER,
            args,
            Some(SessionCallback::event(
                EventKind::Global { event_type },
                handler,
            )),
        ))
    }

    /// Removes a previously registered global event handler.
    ///
    /// The handler is matched by identity. When the frame no longer
    /// holds handlers for the event type, the host is told to stop
    /// relaying it; returns the outcome of that remote call, or `None`
    /// when nothing needed to be sent.
    pub fn remove_event_listener(
        &mut self,
        event_type: &str,
        handler: &EventHandler,
        tab_id: Option<&str>,
    ) -> Option<DispatchOutcome> {
        if event_type.is_empty() {
            return None;
        }
        let event_type = self.qualify(event_type, tab_id);
        let flags = self
            .session
            .remove_global_handler(ADD_EVENT_LISTENER, &event_type, handler)?;
        if !flags.any() {
            return None;
        }
        let mut args = versioned_args();
        args.set("eventType", event_type);
        args.set("unregisterFrameForEvent", flags.unregister_frame_for_event);
        args.set(
            "unregisterFrameForEveryEvent",
            flags.unregister_frame_for_every_event,
        );
        Some(self.call("removeEventListener", args, None))
    }

    fn qualify(&self, event_type: &str, tab_id: Option<&str>) -> String {
        if events::is_console_event_type(event_type) {
            events::qualified_event_type(event_type, tab_id)
        } else {
            event_type.to_string()
        }
    }

    /// Fires a custom event to every listening frame.
    pub fn fire_event(
        &mut self,
        event_type: &str,
        message: &str,
        callback: Option<ResponseCallback>,
    ) -> ClientResult<DispatchOutcome> {
        if event_type.is_empty() {
            return Err(ClientError::InvalidArgument("empty event type".to_string()));
        }
        let mut args = versioned_args();
        args.set("eventType", event_type);
        args.set("message", message);
        Ok(self.call("fireEvent", args, callback))
    }

    /// Subscribes to push notifications for the given entity types.
    ///
    /// Only one listener is allowed per page; a second registration is
    /// rejected without touching the host.
    pub fn add_push_notification_listener(
        &mut self,
        entities: Vec<String>,
        handler: EventHandler,
    ) -> ClientResult<DispatchOutcome> {
        if self.session.has_listener(ADD_PUSH_NOTIFICATION_LISTENER) {
            warn!("a push notification listener is already registered on this page");
            return Err(ClientError::DuplicateListener(
                "push notification listener already registered".to_string(),
            ));
        }
        let mut args = versioned_args();
        args.set("entities", entities);
        args.set("event", true);
        Ok(self.session.execute(
            ADD_PUSH_NOTIFICATION_LISTENER,
            args,
            Some(SessionCallback::event(EventKind::Plain, handler)),
        ))
    }

    /// Drops the push notification listener, if one is registered.
    pub fn remove_push_notification_listener(
        &mut self,
        callback: Option<ResponseCallback>,
    ) -> Option<DispatchOutcome> {
        if !self.session.remove_listener(ADD_PUSH_NOTIFICATION_LISTENER) {
            return None;
        }
        Some(self.call("removePushNotificationListener", versioned_args(), callback))
    }

    /// Adds a title to the rotating browser title queue.
    pub fn add_to_browser_title_queue(
        &mut self,
        title: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("title", title);
        self.call("addToBrowserTitleQueue", args, callback)
    }

    /// Removes a title from the rotating browser title queue.
    pub fn remove_from_browser_title_queue(
        &mut self,
        title: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("title", title);
        self.call("removeFromBrowserTitleQueue", args, callback)
    }

    /// Fetches a console link for a tab at the requested level.
    pub fn get_tab_link(
        &mut self,
        level: TabLink,
        tab_id: Option<&str>,
        callback: ResponseCallback,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("level", level.as_str());
        args.set_opt("tabId", tab_id);
        self.call("getTabLink", args, Some(callback))
    }

    /// Sets the CSS style of a tab.
    pub fn set_tab_style(
        &mut self,
        style: &str,
        tab_id: Option<&str>,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("css", style);
        args.set_opt("tabId", tab_id);
        self.call("setTabStyle", args, callback)
    }

    /// Sets the CSS style of a tab's text.
    pub fn set_tab_text_style(
        &mut self,
        style: &str,
        tab_id: Option<&str>,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("css", style);
        args.set_opt("tabId", tab_id);
        self.call("setTabTextStyle", args, callback)
    }

    /// Sets the icon of a tab.
    pub fn set_tab_icon(
        &mut self,
        icon_url: &str,
        tab_id: Option<&str>,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("iconUrl", icon_url);
        args.set_opt("tabId", tab_id);
        self.call("setTabIcon", args, callback)
    }

    /// Records this page's URL as the external link of its subtab.
    pub fn set_tab_link(&mut self, callback: Option<ResponseCallback>) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("link", self.session.page_url().to_string());
        self.call("setTabLink", args, callback)
    }

    /// Builds a console URL bundling the given page URLs.
    pub fn generate_console_url(
        &mut self,
        urls: Vec<String>,
        callback: ResponseCallback,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("urls", urls);
        self.call("generateConsoleUrl", args, Some(callback))
    }

    /// Opens a console URL as a primary tab with optional subtabs.
    pub fn open_console_url(
        &mut self,
        tab_id: Option<&str>,
        console_url: &str,
        active: bool,
        tab_labels: Option<Vec<String>>,
        tab_names: Option<Vec<String>>,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set_opt("tabId", tab_id);
        args.set("consoleUrl", console_url);
        args.set("active", active);
        if let Some(labels) = tab_labels {
            args.set("tabLabels", labels);
        }
        if let Some(names) = tab_names {
            args.set("tabNames", names);
        }
        self.call("openConsoleUrl", args, callback)
    }

    /// Identifier of the selected navigation tab.
    pub fn get_selected_navigation_tab(&mut self, callback: ResponseCallback) -> DispatchOutcome {
        self.call("getSelectedNavigationTab", versioned_args(), Some(callback))
    }

    /// Selects a navigation tab by id, optionally with a list view.
    pub fn set_selected_navigation_tab(
        &mut self,
        navigation_tab_id: Option<&str>,
        list_view_url: Option<&str>,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set_opt("navigationTabId", navigation_tab_id);
        args.set_opt("listViewUrl", list_view_url);
        self.call("setSelectedNavigationTab", args, callback)
    }

    /// Lists all items in the navigation panel.
    pub fn get_navigation_tabs(&mut self, callback: ResponseCallback) -> DispatchOutcome {
        self.call("getNavigationTabs", versioned_args(), Some(callback))
    }

    /// Focuses the navigation panel.
    pub fn focus_navigation_tab(&mut self, callback: Option<ResponseCallback>) -> DispatchOutcome {
        self.call("focusNavigationTab", versioned_args(), callback)
    }

    /// Refreshes the navigation panel.
    pub fn refresh_navigation_tab(&mut self, callback: Option<ResponseCallback>) -> DispatchOutcome {
        self.call("refreshNavigationTab", versioned_args(), callback)
    }

    /// Focuses a sidebar component described by `component_info` JSON.
    pub fn focus_sidebar_component(
        &mut self,
        component_info: &str,
        tab_id: Option<&str>,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("componentInfo", component_info);
        args.set_opt("tabId", tab_id);
        self.call("focusSidebarComponent", args, callback)
    }

    /// Shows or hides a sidebar region of a tab.
    pub fn set_sidebar_visible(
        &mut self,
        visible: bool,
        tab_id: Option<&str>,
        region: Option<Region>,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("visible", visible);
        args.set_opt("tabId", tab_id);
        if let Some(region) = region {
            args.set("region", region.as_str());
        }
        self.call("setSidebarVisible", args, callback)
    }

    /// Selects and displays the given macro.
    pub fn select_macro(
        &mut self,
        macro_id: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("macroId", macro_id);
        self.call("selectMacro", args, callback)
    }

    /// Runs the selected macro.
    pub fn run_selected_macro(&mut self, callback: Option<ResponseCallback>) -> DispatchOutcome {
        self.call("runSelectedMacro", versioned_args(), callback)
    }
}

/// Convenience for wrapping a closure as a boxed response callback.
pub fn response<F>(callback: F) -> ResponseCallback
where
    F: FnOnce(&ArgBag, &crate::registry::FrameContext) + 'static,
{
    Box::new(callback)
}

/// Convenience for wrapping a closure as a shared event handler.
pub fn handler<F>(handler: F) -> EventHandler
where
    F: Fn(&ArgBag, &crate::registry::FrameContext) + 'static,
{
    Rc::new(handler)
}
