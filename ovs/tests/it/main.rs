mod port_range;
