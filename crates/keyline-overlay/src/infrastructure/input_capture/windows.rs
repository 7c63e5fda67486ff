//! Windows raw input capture.
//!
//! A hidden window is created on a dedicated message-loop thread and
//! registered for raw keyboard and mouse input with `RIDEV_INPUTSINK`, so
//! events arrive regardless of which application has focus.  Each
//! `WM_INPUT` payload is copied out with `GetRawInputData` and handed to the
//! thread's [`InputRecorder`].
//!
//! Teardown posts `WM_CLOSE` to the window; the window procedure unregisters
//! the devices and destroys the window, which ends the message loop, and the
//! guard joins the thread.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::cell::RefCell;
use std::ffi::c_void;
use std::sync::mpsc;
use std::sync::Once;
use std::thread;

use keyline_core::protocol::raw_input::{RawInputError, HEADER_SIZE, MAX_PAYLOAD_SIZE};
use tracing::{debug, info, warn};
use windows::core::{w, PCWSTR};
use windows::Win32::Devices::HumanInterfaceDevice::{
    HID_USAGE_GENERIC_KEYBOARD, HID_USAGE_GENERIC_MOUSE, HID_USAGE_PAGE_GENERIC,
};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::{
    GetRawInputData, RegisterRawInputDevices, HRAWINPUT, RAWINPUTDEVICE, RAWINPUTHEADER,
    RIDEV_INPUTSINK, RIDEV_REMOVE, RID_INPUT,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW,
    PostMessageW, PostQuitMessage, RegisterClassExW, MSG, WINDOW_EX_STYLE, WM_CLOSE,
    WM_DESTROY, WM_INPUT, WNDCLASSEXW, WS_OVERLAPPEDWINDOW,
};

use super::{CaptureError, CaptureGuard, InputSource};
use crate::application::record_input::InputRecorder;

const CLASS_NAME: PCWSTR = w!("KeylineRawInputWindow");
const SOURCE_NAME: &str = "windows-raw-input";

static REGISTER_CLASS: Once = Once::new();

thread_local! {
    /// Recorder for the capture window living on this thread.
    static RECORDER: RefCell<Option<InputRecorder>> = const { RefCell::new(None) };
}

/// Raw input subscription backed by a hidden Win32 window.
#[derive(Debug, Default)]
pub struct RawInputWindow;

impl RawInputWindow {
    /// Creates a new (unstarted) source.
    pub fn new() -> Self {
        Self
    }
}

impl InputSource for RawInputWindow {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn start(&self, recorder: InputRecorder) -> Result<CaptureGuard, CaptureError> {
        // The window handle is sent back as an integer; HWND is not Send.
        let (ready_tx, ready_rx) = mpsc::channel::<Result<isize, CaptureError>>();

        let loop_thread = thread::Builder::new()
            .name("keyline-raw-input".to_string())
            .spawn(move || run_message_loop(recorder, ready_tx))
            .map_err(|e| CaptureError::WindowCreationFailed(e.to_string()))?;

        let hwnd = match ready_rx.recv() {
            Ok(Ok(hwnd)) => hwnd,
            Ok(Err(e)) => {
                let _ = loop_thread.join();
                return Err(e);
            }
            Err(_) => {
                let _ = loop_thread.join();
                return Err(CaptureError::WindowCreationFailed(
                    "message loop thread exited before creating the window".to_string(),
                ));
            }
        };

        info!(source = SOURCE_NAME, "raw input capture started");
        Ok(CaptureGuard::new(SOURCE_NAME, move || {
            // SAFETY: posting to a window owned by another thread is allowed;
            // if the window is already gone the call fails harmlessly.
            let posted =
                unsafe { PostMessageW(Some(HWND(hwnd as *mut c_void)), WM_CLOSE, WPARAM(0), LPARAM(0)) };
            if let Err(e) = posted {
                warn!("failed to post WM_CLOSE to capture window: {e}");
            }
            if loop_thread.join().is_err() {
                warn!("raw input message loop thread panicked");
            }
        }))
    }
}

/// Entry point for the dedicated message-loop thread.
fn run_message_loop(recorder: InputRecorder, ready: mpsc::Sender<Result<isize, CaptureError>>) {
    let hwnd = match create_capture_window() {
        Ok(hwnd) => hwnd,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    if let Err(e) = register_devices(hwnd, RIDEV_INPUTSINK) {
        // SAFETY: hwnd was created on this thread and is still valid.
        unsafe {
            let _ = DestroyWindow(hwnd);
        }
        let _ = ready.send(Err(e));
        return;
    }

    RECORDER.with(|slot| *slot.borrow_mut() = Some(recorder));
    let _ = ready.send(Ok(hwnd.0 as isize));

    let mut msg = MSG::default();
    // SAFETY: Standard Win32 GetMessage/DispatchMessage loop pattern.
    // GetMessageW returns -1 on error and 0 on WM_QUIT.
    unsafe {
        while GetMessageW(&mut msg, None, 0, 0).0 > 0 {
            DispatchMessageW(&msg);
        }
    }

    RECORDER.with(|slot| *slot.borrow_mut() = None);
    debug!("raw input message loop exited");
}

fn create_capture_window() -> Result<HWND, CaptureError> {
    // SAFETY: GetModuleHandleW(None) returns the handle of the current module.
    let instance = unsafe { GetModuleHandleW(None) }
        .map_err(|e| CaptureError::WindowCreationFailed(e.to_string()))?;

    REGISTER_CLASS.call_once(|| {
        let class = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            lpfnWndProc: Some(window_proc),
            hInstance: instance.into(),
            lpszClassName: CLASS_NAME,
            ..Default::default()
        };
        // SAFETY: `class` is fully initialised and outlives the call.
        if unsafe { RegisterClassExW(&class) } == 0 {
            warn!("RegisterClassExW failed; window creation will likely fail");
        }
    });

    // SAFETY: the class is registered above; the window is never shown
    // because WS_VISIBLE is not set.
    unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            CLASS_NAME,
            w!("Keyline Raw Input"),
            WS_OVERLAPPEDWINDOW,
            0,
            0,
            100,
            100,
            None,
            None,
            Some(instance.into()),
            None,
        )
    }
    .map_err(|e| CaptureError::WindowCreationFailed(e.to_string()))
}

fn register_devices(
    hwnd: HWND,
    flags: windows::Win32::UI::Input::RAWINPUTDEVICE_FLAGS,
) -> Result<(), CaptureError> {
    // RIDEV_REMOVE requires a null target window.
    let target = if flags == RIDEV_REMOVE { HWND::default() } else { hwnd };
    let devices = [
        RAWINPUTDEVICE {
            usUsagePage: HID_USAGE_PAGE_GENERIC,
            usUsage: HID_USAGE_GENERIC_MOUSE,
            dwFlags: flags,
            hwndTarget: target,
        },
        RAWINPUTDEVICE {
            usUsagePage: HID_USAGE_PAGE_GENERIC,
            usUsage: HID_USAGE_GENERIC_KEYBOARD,
            dwFlags: flags,
            hwndTarget: target,
        },
    ];
    // SAFETY: `devices` is a valid slice of initialised RAWINPUTDEVICE structs.
    unsafe { RegisterRawInputDevices(&devices, std::mem::size_of::<RAWINPUTDEVICE>() as u32) }
        .map_err(|e| CaptureError::RegistrationFailed(e.to_string()))
}

/// Window procedure for the capture window.
///
/// # Safety
///
/// Called by Windows on the message-loop thread.
unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_INPUT => {
            RECORDER.with(|slot| {
                if let Some(recorder) = slot.borrow().as_ref() {
                    read_payload(recorder, HRAWINPUT(lparam.0 as *mut c_void));
                }
            });
        }
        WM_CLOSE => {
            if let Err(e) = register_devices(hwnd, RIDEV_REMOVE) {
                warn!("failed to unregister raw input devices: {e}");
            }
            // SAFETY: hwnd is this thread's window.
            let _ = DestroyWindow(hwnd);
            return LRESULT(0);
        }
        WM_DESTROY => {
            PostQuitMessage(0);
            return LRESULT(0);
        }
        _ => {}
    }
    // SAFETY: WM_INPUT must still reach DefWindowProcW so the OS can free
    // the input buffer.
    DefWindowProcW(hwnd, msg, wparam, lparam)
}

/// Copies one `WM_INPUT` payload out and hands it to the recorder.
fn read_payload(recorder: &InputRecorder, handle: HRAWINPUT) {
    let header_size = std::mem::size_of::<RAWINPUTHEADER>() as u32;
    debug_assert_eq!(header_size as usize, HEADER_SIZE);

    let mut size = 0u32;
    // SAFETY: a null data pointer asks only for the required size.
    let status = unsafe { GetRawInputData(handle, RID_INPUT, None, &mut size, header_size) };
    if status == u32::MAX || size == 0 {
        recorder.reject(RawInputError::Empty);
        return;
    }
    if size as usize > MAX_PAYLOAD_SIZE {
        recorder.reject(RawInputError::Oversized {
            size: size as usize,
            max: MAX_PAYLOAD_SIZE,
        });
        return;
    }

    let mut buffer = vec![0u8; size as usize];
    // SAFETY: `buffer` holds exactly `size` writable bytes.
    let copied = unsafe {
        GetRawInputData(
            handle,
            RID_INPUT,
            Some(buffer.as_mut_ptr().cast()),
            &mut size,
            header_size,
        )
    };
    if copied == u32::MAX || copied as usize != buffer.len() {
        recorder.reject(RawInputError::Truncated {
            needed: buffer.len(),
            available: if copied == u32::MAX { 0 } else { copied as usize },
        });
        return;
    }

    recorder.handle_payload(&buffer);
}
