//! Property tests: every driver survives arbitrary input packets.

use padbridge_controller_types::ControllerConfig;
use padbridge_controllers::{Controller, Decoded, create_controller};
use padbridge_usb::memory::MemoryDevice;
use padbridge_usb::{InterfaceDescriptor, UsbDeviceInfo};
use proptest::prelude::*;

fn devices() -> Vec<UsbDeviceInfo> {
    vec![
        UsbDeviceInfo::new(0x054C, 0x0268, "ds3").with_interface(InterfaceDescriptor::hid(0)),
        UsbDeviceInfo::new(0x054C, 0x05C4, "ds4").with_interface(InterfaceDescriptor::hid(0)),
        UsbDeviceInfo::new(0x045E, 0x02DD, "xbox").with_interface(InterfaceDescriptor::xbox_one(0)),
        UsbDeviceInfo::new(0x057E, 0x0337, "gc").with_interface(InterfaceDescriptor::hid(0)),
        UsbDeviceInfo::new(0x0079, 0x0006, "pad").with_interface(InterfaceDescriptor::hid(0)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_arbitrary_packets_never_panic(
        device in 0usize..5,
        packets in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..64), 1..8),
    ) {
        let info = devices().swap_remove(device);
        let (memory, handle) = MemoryDevice::new(info);
        let Some(mut controller) = create_controller(Box::new(memory), ControllerConfig::default()) else {
            return Err(TestCaseError::fail("no driver"));
        };
        prop_assert!(controller.initialize().is_ok());

        for packet in packets {
            prop_assert!(handle.push_report(0, packet));
            let poll = controller.read_input(10_000);
            prop_assert!(poll.index < controller.input_count());
            if let Ok(Decoded::Input(buttons)) = poll.result {
                for stick in buttons.sticks {
                    prop_assert!((-1.0..=1.0).contains(&stick.axis_x));
                    prop_assert!((-1.0..=1.0).contains(&stick.axis_y));
                }
            }
        }
    }
}

#[test]
fn exit_closes_device() -> Result<(), Box<dyn std::error::Error>> {
    for info in devices() {
        let (memory, handle) = MemoryDevice::new(info);
        let mut controller =
            create_controller(Box::new(memory), ControllerConfig::default()).ok_or("no driver")?;
        controller.initialize()?;
        assert!(handle.is_open());
        controller.exit();
        assert!(!handle.is_open());
        assert!(controller.read_raw(1_000).result.is_err());
    }
    Ok(())
}
